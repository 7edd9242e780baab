use crate::error::ServiceError;
use crate::gateway::{InlineMedia, ModelGateway};

pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

const CAPTION_PROMPT: &str = "Generate a creative and descriptive caption for this image \
in 1-2 sentences. Make it engaging and informative.";

/// Image payload for a caption request. `mime_type` is the caller's declared
/// media type; handlers substitute [`DEFAULT_MIME_TYPE`] when it is absent.
#[derive(Debug, Clone)]
pub struct CaptionRequest {
    pub image_data: Vec<u8>,
    pub mime_type: String,
}

/// Asks the model for a short descriptive caption of the image.
///
/// Empty model output is a typed failure here, not a placeholder string: the
/// embedding UI decides what to show on `EmptyResult`.
pub async fn generate_caption(
    gateway: &dyn ModelGateway,
    request: CaptionRequest,
) -> Result<String, ServiceError> {
    if request.image_data.is_empty() {
        return Err(ServiceError::Validation(
            "no image data provided".to_string(),
        ));
    }

    tracing::info!(mime_type = %request.mime_type, "generating image caption");

    let media = InlineMedia {
        data: request.image_data,
        mime_type: request.mime_type,
    };
    let text = gateway.invoke(CAPTION_PROMPT, Some(media)).await?;

    let caption = text.trim().to_string();
    if caption.is_empty() {
        return Err(ServiceError::EmptyResult(
            "the model returned an empty caption".to_string(),
        ));
    }
    Ok(caption)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::test_support::ScriptedGateway;

    fn request() -> CaptionRequest {
        CaptionRequest {
            image_data: vec![0xFF, 0xD8, 0xFF],
            mime_type: "image/jpeg".to_string(),
        }
    }

    #[tokio::test]
    async fn returns_trimmed_model_text() {
        let gateway = ScriptedGateway::replying("  A quiet harbor at dusk.  \n");
        let caption = generate_caption(&gateway, request()).await.unwrap();
        assert_eq!(caption, "A quiet harbor at dusk.");
    }

    #[tokio::test]
    async fn missing_image_never_reaches_the_gateway() {
        let gateway = ScriptedGateway::replying("unused");
        let err = generate_caption(
            &gateway,
            CaptionRequest {
                image_data: Vec::new(),
                mime_type: "image/png".to_string(),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn image_is_forwarded_as_inline_media() {
        let gateway = ScriptedGateway::replying("A caption");
        generate_caption(&gateway, request()).await.unwrap();

        let calls = gateway.calls.lock().unwrap();
        let (prompt, media) = &calls[0];
        assert!(prompt.contains("1-2 sentences"));
        let media = media.as_ref().expect("inline media attached");
        assert_eq!(media.data, vec![0xFF, 0xD8, 0xFF]);
        assert_eq!(media.mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn blank_model_output_is_an_empty_result() {
        let gateway = ScriptedGateway::replying("   \n\t");
        let err = generate_caption(&gateway, request()).await.unwrap_err();
        assert!(matches!(err, ServiceError::EmptyResult(_)));
    }

    #[tokio::test]
    async fn upstream_failure_propagates() {
        let gateway =
            ScriptedGateway::failing(ServiceError::Upstream("connection reset".to_string()));
        let err = generate_caption(&gateway, request()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Upstream(_)));
    }
}
