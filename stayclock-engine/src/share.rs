//! Self-contained share tokens: base64url(JSON(visits)).
//!
//! Tokens are emitted without padding; decoding accepts either form so
//! links that passed through a padding-happy encoder still load.
use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::error::ShareError;
use crate::visit::{Visit, first_duplicate_id};

const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode a visit list into a URL-safe token.
///
/// # Errors
///
/// Returns an error if the list cannot be serialized to JSON.
pub fn encode_share_token(visits: &[Visit]) -> Result<String, ShareError> {
    let json = serde_json::to_vec(visits)?;
    let token = TOKEN_ENGINE.encode(json);
    log::debug!("encoded {} visits into {} byte share token", visits.len(), token.len());
    Ok(token)
}

/// Decode a token produced by [`encode_share_token`].
///
/// # Errors
///
/// Returns an error if the token is not base64url, the payload is not UTF-8,
/// the JSON does not describe a list of valid visits, or two visits share an id.
pub fn decode_share_token(token: &str) -> Result<Vec<Visit>, ShareError> {
    let bytes = TOKEN_ENGINE.decode(token.trim())?;
    let json = String::from_utf8(bytes)?;
    let visits: Vec<Visit> = serde_json::from_str(&json)?;

    if let Some(dup) = first_duplicate_id(&visits) {
        return Err(ShareError::DuplicateId(dup));
    }
    Ok(visits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visit::VisitId;
    use base64::Engine as _;
    use chrono::NaiveDate;

    fn sample() -> Vec<Visit> {
        let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
        vec![
            Visit::new(VisitId(1), d(1, 5), d(1, 19), "Berlin").unwrap(),
            Visit::new(VisitId(2), d(3, 2), d(3, 2), "Zürich ✈").unwrap(),
        ]
    }

    #[test]
    fn token_is_url_safe_without_padding() {
        let token = encode_share_token(&sample()).unwrap();
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_eq!(decode_share_token(&token).unwrap(), sample());
    }

    #[test]
    fn padded_tokens_are_accepted() {
        let json = serde_json::to_vec(&sample()).unwrap();
        let padded = base64::engine::general_purpose::URL_SAFE.encode(json);
        assert_eq!(decode_share_token(&padded).unwrap(), sample());
    }

    #[test]
    fn empty_list_round_trips() {
        let token = encode_share_token(&[]).unwrap();
        assert!(decode_share_token(&token).unwrap().is_empty());
    }

    #[test]
    fn malformed_tokens_report_the_failing_layer() {
        assert!(matches!(
            decode_share_token("not*base64"),
            Err(ShareError::Base64(_))
        ));

        let not_utf8 = TOKEN_ENGINE.encode([0xff, 0xfe, 0xfd]);
        assert!(matches!(
            decode_share_token(&not_utf8),
            Err(ShareError::Utf8(_))
        ));

        let not_json = TOKEN_ENGINE.encode("hello");
        assert!(matches!(
            decode_share_token(&not_json),
            Err(ShareError::Json(_))
        ));

        let wrong_shape = TOKEN_ENGINE.encode(r#"[{"id":1}]"#);
        assert!(matches!(
            decode_share_token(&wrong_shape),
            Err(ShareError::Json(_))
        ));

        let reversed = TOKEN_ENGINE.encode(
            r#"[{"id":1,"entryDate":"2024-02-02","exitDate":"2024-02-01","location":"x"}]"#,
        );
        assert!(matches!(
            decode_share_token(&reversed),
            Err(ShareError::Json(_))
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let dup = TOKEN_ENGINE.encode(
            r#"[{"id":4,"entryDate":"2024-02-01","exitDate":"2024-02-01","location":"a"},
                {"id":4,"entryDate":"2024-03-01","exitDate":"2024-03-02","location":"b"}]"#,
        );
        assert!(matches!(
            decode_share_token(&dup),
            Err(ShareError::DuplicateId(VisitId(4)))
        ));
    }
}
