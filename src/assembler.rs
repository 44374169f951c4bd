//! Document reassembly.
//!
//! Applies position-aware edits to the original document text using the
//! byte spans captured by the scanner: removed inclusions are cut out, and
//! the main script element is replaced by a module script holding the
//! rewritten code. Everything else, whitelisted inclusions included, keeps
//! its original bytes. Edits are sorted by position and applied from the end
//! so earlier offsets stay valid.

use crate::classifier::Classification;

/// A single text replacement with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub start: usize,
    pub end: usize,
    pub new_text: String,
}

/// Builds the converted document from the original text, its classification,
/// and the module code that becomes the main script's content.
pub fn assemble(document: &str, classification: &Classification, module_code: &str) -> String {
    let main = classification.main_script();

    let mut replacements: Vec<Replacement> = classification
        .removed_regions()
        .map(|region| Replacement {
            start: region.start,
            end: region.end,
            new_text: String::new(),
        })
        .collect();
    replacements.push(Replacement {
        start: main.start,
        end: main.end,
        new_text: format!("<script type=\"module\">{module_code}</script>"),
    });

    apply_replacements(document, replacements)
}

/// Applies replacements to `content`, returning the modified string.
///
/// Sorts replacements by start offset (descending) and applies each in turn.
/// Out-of-range or inverted spans are skipped.
pub fn apply_replacements(content: &str, mut replacements: Vec<Replacement>) -> String {
    replacements.sort_by(|a, b| b.start.cmp(&a.start));

    let mut result = content.to_string();
    for rep in replacements {
        if rep.start <= rep.end && rep.end <= result.len() {
            result.replace_range(rep.start..rep.end, &rep.new_text);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::conventions::Conventions;
    use crate::registry::SymbolRegistry;

    fn rep(start: usize, end: usize, text: &str) -> Replacement {
        Replacement {
            start,
            end,
            new_text: text.to_string(),
        }
    }

    #[test]
    fn replaces_multiple_spans_regardless_of_order() {
        let content = "<a></a><b></b><c></c>";
        let result = apply_replacements(content, vec![rep(0, 7, ""), rep(14, 21, "<d></d>")]);
        assert_eq!(result, "<b></b><d></d>");
    }

    #[test]
    fn handles_different_length_replacements() {
        let content = "x = 1; y = 2;";
        let result = apply_replacements(content, vec![rep(4, 5, "100"), rep(11, 12, "")]);
        assert_eq!(result, "x = 100; y = ;");
    }

    #[test]
    fn skips_out_of_range_spans() {
        let content = "short";
        let result = apply_replacements(content, vec![rep(3, 99, "!"), rep(4, 2, "?")]);
        assert_eq!(result, "short");
    }

    #[test]
    fn empty_replacements_return_original() {
        assert_eq!(apply_replacements("same", Vec::new()), "same");
    }

    #[test]
    fn assembles_module_document() {
        let doc = "<head>\n\t<script src=\"../build/three.js\"></script>\n\t<script src=\"js/WebGL.js\"></script>\n\t<script src=\"js/controls/OrbitControls.js\"></script>\n</head>\n<body>\n\t<script>\n\t\tgo();\n\t</script>\n</body>\n";
        let registry = SymbolRegistry::new(
            ["OrbitControls", "WebGL"],
            ["OrbitControls"],
            ["js/WebGL.js"],
        );
        let classification = classify(doc, &registry, &Conventions::default()).unwrap();

        let result = assemble(doc, &classification, "\n\t\timport {} from 'x';\n\n\t\tgo();\n\t");
        assert_eq!(
            result,
            "<head>\n\t\n\t<script src=\"js/WebGL.js\"></script>\n\t\n</head>\n<body>\n\t<script type=\"module\">\n\t\timport {} from 'x';\n\n\t\tgo();\n\t</script>\n</body>\n"
        );
    }
}
