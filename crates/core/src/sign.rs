//! Sign request payload construction.
//!
//! Signers and generated output files are stored as opaque JSON on the sign
//! request record; this module builds them from the caller's input.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status given to newly created sign requests.
pub const DEFAULT_SIGN_STATUS: &str = "created";

/// Base URL of generated embed links.
pub const EMBED_URL_BASE: &str = "https://box-mock.local/sign";

/// Signer as submitted by the caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignerInput {
    /// Signer email.
    #[serde(default)]
    pub email: Option<String>,
    /// Signer role, `"signer"` when omitted.
    #[serde(default)]
    pub role: Option<String>,
}

/// Source file reference as submitted by the caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceFileInput {
    /// Source file ID.
    #[serde(default)]
    pub id: Option<String>,
}

/// Signer stored on a sign request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signer {
    /// Always `"signer"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Signer email.
    pub email: Option<String>,
    /// Signer role.
    pub role: String,
    /// Link the signer follows to sign.
    pub embed_url: String,
}

/// Output document generated for a sign request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignFile {
    /// Always `"file"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Generated file ID.
    pub id: String,
    /// Generated file name.
    pub name: String,
}

/// Build stored signers, each with a unique embed link under the request.
#[must_use]
pub fn build_signers(sign_request_id: &str, inputs: &[SignerInput]) -> Vec<Signer> {
    inputs
        .iter()
        .map(|input| Signer {
            kind: "signer".to_string(),
            email: input.email.clone(),
            role: input.role.clone().unwrap_or_else(|| "signer".to_string()),
            embed_url: format!("{EMBED_URL_BASE}/{sign_request_id}/{}", Uuid::new_v4()),
        })
        .collect()
}

/// Build one signed output document per source file.
#[must_use]
pub fn build_output_files(sources: &[SourceFileInput]) -> Vec<SignFile> {
    sources
        .iter()
        .map(|source| {
            let source_id = source
                .id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            SignFile {
                kind: "file".to_string(),
                id: Uuid::new_v4().to_string(),
                name: format!("signed_document_{source_id}.pdf"),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_signers_defaults_role() {
        let inputs = vec![
            SignerInput {
                email: Some("a@example.com".into()),
                role: None,
            },
            SignerInput {
                email: Some("b@example.com".into()),
                role: Some("approver".into()),
            },
        ];

        let signers = build_signers("sr-1", &inputs);
        assert_eq!(signers.len(), 2);
        assert_eq!(signers[0].role, "signer");
        assert_eq!(signers[1].role, "approver");
        assert!(signers[0].embed_url.starts_with("https://box-mock.local/sign/sr-1/"));
        assert_ne!(signers[0].embed_url, signers[1].embed_url);
    }

    #[test]
    fn test_build_output_files_names_after_source() {
        let files = build_output_files(&[SourceFileInput {
            id: Some("123".into()),
        }]);
        assert_eq!(files[0].name, "signed_document_123.pdf");
        assert_eq!(files[0].kind, "file");
    }

    #[test]
    fn test_build_output_files_without_source_id() {
        let files = build_output_files(&[SourceFileInput::default()]);
        assert!(files[0].name.starts_with("signed_document_"));
        assert!(files[0].name.ends_with(".pdf"));
    }

    #[test]
    fn test_signer_serializes_type_field() {
        let signer = &build_signers("sr", &[SignerInput::default()])[0];
        let value = serde_json::to_value(signer).unwrap();
        assert_eq!(value["type"], "signer");
        assert!(value["email"].is_null());
    }
}
