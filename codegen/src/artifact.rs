use serde::Serialize;

/// Separates the glue declaration from the glue body in the combined text.
pub const DELIMITER: &str = "!DELIMITER!";

/// Everything one generation pass produces. Regenerating replaces the whole
/// artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedArtifact {
    /// Sanitized, lower-cased block type, as in the definition's `"type"`.
    pub block_type: String,
    pub definition: String,
    pub glue_declaration: String,
    pub glue_body: String,
    pub export: BlockExport,
}

impl GeneratedArtifact {
    /// Declaration and body joined by [`DELIMITER`].
    pub fn glue(&self) -> String {
        format!("{}{}{}", self.glue_declaration, DELIMITER, self.glue_body)
    }
}

/// Split combined glue text on the first delimiter. Text without one is all
/// declaration.
pub fn split_glue(glue: &str) -> (&str, &str) {
    glue.split_once(DELIMITER).unwrap_or((glue, ""))
}

/// The block bundled for saving alongside others.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockExport {
    pub file_name: String,
    pub category: String,
    pub description: String,
    pub json_code: String,
    pub interpreter_declaration: String,
    pub js_code: String,
    pub custom_name: String,
}

impl BlockExport {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
