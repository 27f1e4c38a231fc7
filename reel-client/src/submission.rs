//! Request body encoding
//!
//! Creation requests go out as multipart forms, remix requests as JSON.
//! The service tells an absent field apart from an empty one, so optional
//! fields are left out of the form entirely when they carry no value.

use reel_core::domain::model::{ALLOWED_SECONDS, is_allowed_seconds};
use reel_core::dto::video::{CreateVideo, RemixVideo};
use reqwest::Body;
use reqwest::multipart::{Form, Part};
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::attachment::{Attachment, AttachmentSource};
use crate::error::{ClientError, Result};

/// Name of the multipart file part carrying the reference
pub const INPUT_REFERENCE_FIELD: &str = "input_reference";

/// Text fields of a creation form, in wire order
///
/// `prompt` is always present; `model`, `seconds` and `size` only when set.
pub fn create_fields(req: &CreateVideo) -> Result<Vec<(&'static str, String)>> {
    let prompt = req.prompt.trim();
    if prompt.is_empty() {
        return Err(ClientError::InvalidRequest("prompt cannot be empty".into()));
    }

    let mut fields = vec![("prompt", prompt.to_string())];

    let model = req.model.trim();
    if !model.is_empty() {
        fields.push(("model", model.to_string()));
    }

    if let Some(seconds) = req.seconds {
        if !is_allowed_seconds(seconds) {
            return Err(ClientError::InvalidRequest(format!(
                "duration must be one of {:?} seconds, got {}",
                ALLOWED_SECONDS, seconds
            )));
        }
        fields.push(("seconds", seconds.to_string()));
    }

    let size = req.size.trim();
    if !size.is_empty() {
        fields.push(("size", size.to_string()));
    }

    Ok(fields)
}

/// Build the multipart form for a creation request
///
/// Opens and classifies the reference file when one is set. Fails before
/// anything is sent if the reference is missing or of an unsupported type.
pub async fn encode_create(req: &CreateVideo) -> Result<Form> {
    let fields = create_fields(req)?;
    let attachment = match &req.input_reference {
        Some(path) => Some(Attachment::open(path).await?),
        None => None,
    };

    encode_create_with(fields, attachment).await
}

/// Assemble a form from prepared fields and an optional classified source
pub async fn encode_create_with<S>(
    fields: Vec<(&'static str, String)>,
    attachment: Option<Attachment<S>>,
) -> Result<Form>
where
    S: AttachmentSource + 'static,
{
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(name, value);
    }

    if let Some(attachment) = attachment {
        debug!(
            "Attaching {} ({}, {} bytes)",
            attachment.file_name(),
            attachment.content_type(),
            attachment.len()
        );
        form = form.part(INPUT_REFERENCE_FIELD, reference_part(attachment).await?);
    }

    Ok(form)
}

async fn reference_part<S>(attachment: Attachment<S>) -> Result<Part>
where
    S: AttachmentSource + 'static,
{
    let file_name = attachment.file_name().to_string();
    let content_type = attachment.content_type();
    let len = attachment.len();
    let source = attachment.into_rewound_source().await?;

    let body = Body::wrap_stream(ReaderStream::new(source));
    let part = Part::stream_with_length(body, len)
        .file_name(file_name)
        .mime_str(content_type)?;

    Ok(part)
}

/// Build the JSON body for a remix request
pub fn encode_remix(prompt: &str) -> Result<RemixVideo> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(ClientError::InvalidRequest("prompt cannot be empty".into()));
    }

    Ok(RemixVideo {
        prompt: prompt.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_only() {
        let fields = create_fields(&CreateVideo::new("  a red kite  ")).unwrap();
        assert_eq!(fields, vec![("prompt", "a red kite".to_string())]);
    }

    #[test]
    fn test_all_fields_in_order() {
        let req = CreateVideo::new("a red kite")
            .with_model("sora-2")
            .with_seconds(8)
            .with_size("1280x720");
        let names: Vec<_> = create_fields(&req).unwrap().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["prompt", "model", "seconds", "size"]);
    }

    #[test]
    fn test_blank_optionals_are_omitted() {
        let req = CreateVideo::new("a red kite").with_model(" ").with_size("");
        let fields = create_fields(&req).unwrap();
        assert_eq!(fields.len(), 1);
        assert!(fields.iter().all(|(name, _)| *name != "size" && *name != "seconds"));
    }

    #[test]
    fn test_empty_prompt_rejected() {
        let err = create_fields(&CreateVideo::new("   ")).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_disallowed_duration_rejected() {
        let err = create_fields(&CreateVideo::new("kite").with_seconds(5)).unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }

    #[test]
    fn test_remix_body() {
        let body = encode_remix("  make it night  ").unwrap();
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"prompt": "make it night"})
        );
        assert!(encode_remix("").is_err());
    }

    #[tokio::test]
    async fn test_unsupported_reference_fails_before_send() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.gif");
        tokio::fs::write(&path, b"GIF89a....").await.unwrap();

        let req = CreateVideo::new("kite").with_input_reference(&path);
        let err = encode_create(&req).await.unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedAttachmentType { .. }));
    }
}
