//! Prompt construction for LLM requests.
//!
//! Embeds the schema description and the user's question into a fixed
//! instruction template.

/// Opening line of every prompt.
pub const PREAMBLE: &str = "You are a professional MySQL expert.";

/// The strict rules the model is asked to follow, in order.
pub const RULES: [&str; 5] = [
    "Only use tables and columns provided in schema.",
    "Do NOT invent tables.",
    "Do NOT invent columns.",
    "Return ONLY valid MySQL query.",
    "No explanation. No markdown.",
];

/// Heading placed before the schema text.
pub const SCHEMA_HEADER: &str = "Database Schema:";

/// Heading placed before the question. Everything after it is the question.
pub const QUESTION_HEADER: &str = "User Question:";

/// Composes the full prompt for one generation request.
///
/// Both inputs are embedded verbatim; the question is not escaped or
/// filtered.
pub fn compose_prompt(question: &str, schema_text: &str) -> String {
    let rules: String = RULES
        .iter()
        .enumerate()
        .map(|(i, rule)| format!("{}. {}\n", i + 1, rule))
        .collect();

    format!(
        "{PREAMBLE}\n\nSTRICT RULES:\n{rules}\n{SCHEMA_HEADER}\n{schema_text}\n\n{QUESTION_HEADER}\n{question}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SCHEMA: &str = "\nTable: users\n- id (INT)\n- name (VARCHAR)\n";

    #[test]
    fn test_compose_prompt_exact() {
        let prompt = compose_prompt("How many users are there?", SCHEMA);

        assert_eq!(
            prompt,
            "You are a professional MySQL expert.\n\
             \n\
             STRICT RULES:\n\
             1. Only use tables and columns provided in schema.\n\
             2. Do NOT invent tables.\n\
             3. Do NOT invent columns.\n\
             4. Return ONLY valid MySQL query.\n\
             5. No explanation. No markdown.\n\
             \n\
             Database Schema:\n\
             \nTable: users\n- id (INT)\n- name (VARCHAR)\n\
             \n\
             \n\
             User Question:\n\
             How many users are there?\n"
        );
    }

    #[test]
    fn test_contains_all_rules() {
        let prompt = compose_prompt("q", SCHEMA);
        for rule in RULES {
            assert!(prompt.contains(rule), "missing rule: {rule}");
        }
    }

    #[test]
    fn test_inputs_embedded_verbatim() {
        let question = "Show `orders` where note = '```'; DROP TABLE users; --";
        let prompt = compose_prompt(question, SCHEMA);

        assert!(prompt.contains(SCHEMA));
        assert!(prompt.ends_with(&format!("{question}\n")));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(compose_prompt("a", SCHEMA), compose_prompt("a", SCHEMA));
    }

    #[test]
    fn test_empty_schema() {
        let prompt = compose_prompt("anything", "");
        assert!(prompt.contains("Database Schema:\n\n\nUser Question:"));
    }
}
