pub fn generate_typescript_definitions(
    type_names: &[&str],
) -> Result<String, Box<dyn std::error::Error>> {
    if type_names.is_empty() {
        return Err("No type names provided".into());
    }

    let mut definitions = Vec::new();

    for name in type_names {
        let type_def = export_type(name)?;
        let cleaned = clean_type(type_def);

        if !cleaned.trim().is_empty() {
            definitions.push(cleaned);
        }
    }

    Ok(definitions.join("\n\n"))
}

/// Every type the web front end consumes, in dependency order
pub const API_TYPES: &[&str] = &[
    "QuestionSetStatus",
    "QuestionSetSummary",
    "QuestionType",
    "Question",
    "QuestionSet",
    "FileHandle",
    "AnswerValue",
    "Weekday",
    "Availability",
    "ContactDetails",
    "RequestDetails",
    "RequestStatus",
    "CustomerRequest",
    "NewCustomerRequest",
    "CustomerRequestUpdate",
];

fn export_type(name: &str) -> Result<String, Box<dyn std::error::Error>> {
    use crate::*;
    use ts_rs::TS;

    let result = match name {
        "QuestionSetStatus" => QuestionSetStatus::export_to_string()?,
        "QuestionSetSummary" => QuestionSetSummary::export_to_string()?,
        "QuestionType" => QuestionType::export_to_string()?,
        "Question" => Question::export_to_string()?,
        "QuestionSet" => QuestionSet::export_to_string()?,

        "FileHandle" => FileHandle::export_to_string()?,
        "AnswerValue" => AnswerValue::export_to_string()?,

        "Weekday" => Weekday::export_to_string()?,
        "Availability" => Availability::export_to_string()?,
        "ContactDetails" => ContactDetails::export_to_string()?,
        "RequestDetails" => RequestDetails::export_to_string()?,

        "RequestStatus" => RequestStatus::export_to_string()?,
        "CustomerRequest" => CustomerRequest::export_to_string()?,
        "NewCustomerRequest" => NewCustomerRequest::export_to_string()?,
        "CustomerRequestUpdate" => CustomerRequestUpdate::export_to_string()?,

        _ => {
            return Err(format!(
                "Unknown type: '{}'. Available types can be found in mestermind-types/src/",
                name
            )
            .into());
        }
    };

    Ok(result)
}

fn clean_type(mut type_def: String) -> String {
    type_def.retain(|c| c != '\r');

    let lines: Vec<&str> = type_def.lines().collect();

    let filtered: Vec<&str> = lines
        .iter()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("import type")
                && !trimmed.starts_with("// This file was generated")
        })
        .cloned()
        .collect();

    filtered.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_single_type() {
        let result = generate_typescript_definitions(&["QuestionType"]).unwrap();
        assert!(result.contains("QuestionType"));
        assert!(result.contains("\"multi_select\""));
    }

    #[test]
    fn test_generate_all_api_types() {
        let result = generate_typescript_definitions(API_TYPES).unwrap();
        assert!(result.contains("CustomerRequestUpdate"));
        assert!(result.contains("question_type"));
    }

    #[test]
    fn test_unknown_type_error() {
        let result = generate_typescript_definitions(&["NonExistentType"]);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unknown type"));
    }

    #[test]
    fn test_empty_type_names() {
        let result = generate_typescript_definitions(&[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_omitted_fields_are_optional_properties() {
        let update = generate_typescript_definitions(&["CustomerRequestUpdate"]).unwrap();
        assert!(update.contains("answers?:"));
        assert!(update.contains("current_step?:"));

        let details = generate_typescript_definitions(&["RequestDetails"]).unwrap();
        assert!(details.contains("availability?: Availability"));
        assert!(!details.contains("availability: Availability | null"));

        // Always serialized, so never optional.
        let request = generate_typescript_definitions(&["CustomerRequest"]).unwrap();
        assert!(request.contains("email: string | null"));
    }

    #[test]
    fn test_cleaned_output() {
        let result = generate_typescript_definitions(&["CustomerRequest"]).unwrap();
        assert!(!result.contains("import type"));
        assert!(!result.contains("This file was generated"));
    }
}
