//! LLM prompt engineering for people-count extraction

use crate::config::PromptLanguage;

/// Builds the extraction prompt for one document
pub struct PromptBuilder<'a> {
    text: &'a str,
    filename: &'a str,
    language: PromptLanguage,
    max_input_chars: Option<usize>,
    rules: Option<&'a [String]>,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder with the English rule set
    pub fn new(text: &'a str, filename: &'a str) -> Self {
        Self {
            text,
            filename,
            language: PromptLanguage::English,
            max_input_chars: None,
            rules: None,
        }
    }

    /// Select the rule-set language
    pub fn with_language(mut self, language: PromptLanguage) -> Self {
        self.language = language;
        self
    }

    /// Truncate the embedded text to at most `max_chars` characters
    pub fn with_max_input_chars(mut self, max_chars: Option<usize>) -> Self {
        self.max_input_chars = max_chars;
        self
    }

    /// Replace the built-in rules with a custom ordered list
    pub fn with_rules(mut self, rules: Option<&'a [String]>) -> Self {
        self.rules = rules;
        self
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let templates = Templates::for_language(self.language);
        let mut prompt = String::new();

        // 1. Task statement
        prompt.push_str(templates.intro);
        prompt.push_str("\n\n");

        // 2. Ordered policy list
        prompt.push_str(templates.rules_heading);
        prompt.push('\n');
        match self.rules {
            Some(custom) => {
                let numbered = custom.iter().filter(|r| !r.trim().is_empty());
                for (idx, rule) in numbered.enumerate() {
                    prompt.push_str(&format!("{}. {}\n", idx + 1, rule.trim()));
                }
            }
            None => {
                for (idx, rule) in templates.rules.iter().enumerate() {
                    prompt.push_str(&format!("{}. {}\n", idx + 1, rule));
                }
            }
        }
        prompt.push('\n');

        // 3. The document
        prompt.push_str(templates.text_heading);
        prompt.push('\n');
        prompt.push_str(self.embedded_text());
        prompt.push_str("\n\n");

        // 4. Output schema
        prompt.push_str(templates.output_heading);
        prompt.push('\n');
        prompt.push_str(&output_schema(self.filename));

        prompt
    }

    fn embedded_text(&self) -> &'a str {
        match self.max_input_chars {
            Some(max) => truncate_chars(self.text, max),
            None => self.text,
        }
    }
}

/// Cut `text` to at most `max_chars` characters on a code-point boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// The JSON object the model must return, with the filename filled in
fn output_schema(filename: &str) -> String {
    // Escape through serde_json so quotes in filenames stay valid JSON
    let quoted = serde_json::Value::String(filename.to_string()).to_string();
    format!(
        "```json\n{{\n    \"filename\": {},\n    \"number_of_people\": <integer>\n}}\n```\n",
        quoted
    )
}

struct Templates {
    intro: &'static str,
    rules_heading: &'static str,
    rules: &'static [&'static str],
    text_heading: &'static str,
    output_heading: &'static str,
}

impl Templates {
    fn for_language(language: PromptLanguage) -> Self {
        match language {
            PromptLanguage::English => Templates {
                intro: ENGLISH_INTRO,
                rules_heading: "### Rules:",
                rules: ENGLISH_RULES,
                text_heading: "Text:",
                output_heading: ENGLISH_OUTPUT,
            },
            PromptLanguage::French => Templates {
                intro: FRENCH_INTRO,
                rules_heading: "### Règles :",
                rules: FRENCH_RULES,
                text_heading: "Texte :",
                output_heading: FRENCH_OUTPUT,
            },
            PromptLanguage::EnglishCompact => Templates {
                intro: COMPACT_INTRO,
                rules_heading: "## Rules:",
                rules: COMPACT_RULES,
                text_heading: "## Input Text:",
                output_heading: COMPACT_OUTPUT,
            },
        }
    }
}

const ENGLISH_INTRO: &str = "Extract only the number of people present in a ski outing or event from the given text.
Ignore numbers related to altitude, distance, temperature, or any non-human count.";

const ENGLISH_RULES: &[&str] = &[
    "Extract only numbers indicating the presence of people.",
    "Ignore mentions of altitude, distances, speed, weather, or any unrelated numerical values.",
    "Ignore numbers referring to people leaving, quitting, or departing from the event.",
    "If a phrase mentions a total number of participants, use that number.",
    "If multiple numbers of people appear in a sequence, sum them up.",
    "If the writer mentions themselves and at least one other person, assume a minimum of 2.
   - Example: \"I went skiing with a friend\" → count as 2.
   - Example: \"I went skiing with John and Ricardo\" → count as 3.
   - Example: \"I was there with my group\" → if no specific number is given, assume 3.",
    "If a group of unnamed people is mentioned (e.g., \"some people\", \"a few friends\"), assume 3-4 people.",
    "If no valid number is found but text exists, assume the writer is present and count any people named; if only the writer is present, the count is 1.",
    "Return ONLY a valid JSON object, with no extra text, explanations, or comments.",
];

const ENGLISH_OUTPUT: &str = "Return ONLY this JSON object, with exactly these two fields and no extra text:";

const FRENCH_INTRO: &str = "Extrayez uniquement le nombre de personnes présentes lors d'une sortie ou d'un événement de ski à partir du texte donné.
Ignorez les nombres liés à l'altitude, la distance, la température ou tout autre comptage non humain.";

const FRENCH_RULES: &[&str] = &[
    "Extrayez uniquement les nombres indiquant la présence de personnes.",
    "Ignorez les mentions de l'altitude, des distances, de la vitesse, de la météo ou de toute valeur numérique non pertinente.",
    "Ignorez les nombres faisant référence aux personnes quittant, abandonnant ou partant de l'événement.",
    "Si une phrase mentionne un nombre total de participants, utilisez ce nombre.",
    "Si plusieurs nombres de personnes apparaissent en séquence, additionnez-les.",
    "Si l'auteur mentionne lui-même et au moins une autre personne, supposez un minimum de 2.
   - Exemple : \"Je suis allé skier avec un ami\" → comptez 2.
   - Exemple : \"Je suis allé skier avec John et Ricardo\" → comptez 3.
   - Exemple : \"J'étais là avec mon groupe\" → si aucun nombre n'est donné, supposez 3.",
    "Si un groupe de personnes non nommées est mentionné (ex. : \"un peu de monde\", \"quelques personnes\"), supposez 3 à 4 personnes.",
    "Si aucun nombre valide n'est trouvé mais que du texte est présent, supposez que l'auteur est présent et comptez les personnes nommées ; si seul l'auteur est présent, le nombre est 1.",
    "Retournez UNIQUEMENT un objet JSON valide, sans texte supplémentaire, explications ou commentaires.",
];

const FRENCH_OUTPUT: &str = "Retournez UNIQUEMENT cet objet JSON, avec exactement ces deux champs et sans aucun texte supplémentaire :";

const COMPACT_INTRO: &str = "Extract the number of people present in a ski outing from the given text.
Return the result strictly in JSON format, with no extra text.";

const COMPACT_RULES: &[&str] = &[
    "Extract only numbers indicating people present.",
    "Ignore numbers related to altitude, distance, temperature, speed, weather, or any non-human count.",
    "Ignore numbers about people leaving, quitting, or departing.",
    "If a phrase mentions a total number of participants, use that number.",
    "If multiple numbers represent people, sum them up.",
    "If the writer and at least one other person are present, the count is at least 2.",
    "If only the writer is present, the count is 1.",
    "If no valid number is found but names appear, count named individuals.",
    "If a group is mentioned (e.g., \"some people\", \"a few friends\"), assume 3-4 people.",
    "Return JSON only, without explanations.",
];

const COMPACT_OUTPUT: &str = "## Expected JSON Output Format (return only this object, exactly two fields):";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_text_and_filename() {
        let prompt = PromptBuilder::new("We were five at the hut.", "hut.txt").build();
        assert!(prompt.contains("We were five at the hut."));
        assert!(prompt.contains("\"filename\": \"hut.txt\""));
        assert!(prompt.contains("\"number_of_people\""));
    }

    #[test]
    fn test_rules_are_numbered_in_order() {
        let prompt = PromptBuilder::new("text", "a.txt").build();
        let first = prompt.find("1. Extract only numbers").unwrap();
        let leaving = prompt.find("3. Ignore numbers referring to people leaving").unwrap();
        let last = prompt.find("9. Return ONLY").unwrap();
        assert!(first < leaving && leaving < last);
    }

    #[test]
    fn test_rules_cover_counting_policy() {
        let prompt = PromptBuilder::new("text", "a.txt").build();
        assert!(prompt.contains("altitude"));
        assert!(prompt.contains("sum them up"));
        assert!(prompt.contains("minimum of 2"));
        assert!(prompt.contains("3-4 people"));
        assert!(prompt.contains("the count is 1"));
    }

    #[test]
    fn test_french_rule_set() {
        let prompt = PromptBuilder::new("Nous étions quatre.", "fr.txt")
            .with_language(PromptLanguage::French)
            .build();
        assert!(prompt.contains("### Règles :"));
        assert!(prompt.contains("Texte :"));
        assert!(prompt.contains("3 à 4 personnes"));
        assert!(prompt.contains("Nous étions quatre."));
    }

    #[test]
    fn test_compact_rule_set() {
        let prompt = PromptBuilder::new("text", "a.txt")
            .with_language(PromptLanguage::EnglishCompact)
            .build();
        assert!(prompt.contains("## Input Text:"));
        assert!(!prompt.contains("John and Ricardo"));
        assert!(prompt.contains("8. If no valid number is found but names appear, count named individuals."));
        assert!(prompt.contains("9. If a group is mentioned"));
    }

    #[test]
    fn test_truncation_limits_embedded_text() {
        let text = "a".repeat(2000);
        let prompt = PromptBuilder::new(&text, "long.txt")
            .with_max_input_chars(Some(1500))
            .build();
        assert!(prompt.contains(&"a".repeat(1500)));
        assert!(!prompt.contains(&"a".repeat(1501)));
    }

    #[test]
    fn test_truncate_chars_respects_code_points() {
        assert_eq!(truncate_chars("été au col", 2), "ét");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_custom_rules_replace_builtin() {
        let rules = vec!["Count skiers only.".to_string(), "".to_string(), "Answer in JSON.".to_string()];
        let prompt = PromptBuilder::new("text", "a.txt")
            .with_rules(Some(rules.as_slice()))
            .build();
        assert!(prompt.contains("1. Count skiers only."));
        assert!(prompt.contains("2. Answer in JSON."));
        assert!(!prompt.contains("altitude, distances"));
        // Schema section is always appended
        assert!(prompt.contains("\"number_of_people\""));
    }

    #[test]
    fn test_filename_is_json_escaped() {
        let prompt = PromptBuilder::new("text", "say \"hi\".txt").build();
        assert!(prompt.contains(r#""filename": "say \"hi\".txt""#));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = PromptBuilder::new("text", "a.txt").build();
        let b = PromptBuilder::new("text", "a.txt").build();
        assert_eq!(a, b);
    }
}
