use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use privatebin_crypto::{
    Attachment, Compression, CryptoEngine, CryptoError, EncodeRequest, Expiration, Formatter,
    PasteEnvelope, PasteKey, PrivateBinCipher,
};
use serde_json::json;

// Low iteration count keeps the suite fast; decode reads it from adata.
fn cipher() -> PrivateBinCipher {
    PrivateBinCipher::with_iterations(1_000)
}

fn request(text: &str) -> EncodeRequest {
    EncodeRequest {
        text: text.to_string(),
        attachment: None,
        password: None,
        formatter: Formatter::PlainText,
        burn_after_reading: false,
        discussion: false,
        expiration: Expiration::OneDay,
        compression: Compression::Zlib,
        protocol_version: 2,
    }
}

#[test]
fn encode_decode_roundtrip() {
    let cipher = cipher();
    let encoded = cipher.encode(&request("This is a test.")).unwrap();
    let content = cipher.decode(&encoded.envelope, &encoded.secret, None).unwrap();

    assert_eq!(content.text, "This is a test.");
    assert!(content.attachment.is_none());
}

#[test]
fn roundtrip_with_password_and_attachment() {
    let cipher = cipher();
    let mut req = request("see attached");
    req.password = Some("foobar".into());
    req.attachment = Some(Attachment::new("notes.bin", vec![0u8, 1, 2, 255, 254]));

    let encoded = cipher.encode(&req).unwrap();
    let content = cipher
        .decode(&encoded.envelope, &encoded.secret, Some("foobar"))
        .unwrap();

    assert_eq!(content.text, "see attached");
    let attachment = content.attachment.unwrap();
    assert_eq!(attachment.name, "notes.bin");
    assert_eq!(attachment.content, vec![0u8, 1, 2, 255, 254]);
    assert_eq!(attachment.mime_type, Attachment::DEFAULT_MIME_TYPE);
}

#[test]
fn roundtrip_without_compression() {
    let cipher = cipher();
    let mut req = request("uncompressed");
    req.compression = Compression::None;

    let encoded = cipher.encode(&req).unwrap();
    assert_eq!(encoded.envelope.get("adata").unwrap()[0][7], "none");

    let content = cipher.decode(&encoded.envelope, &encoded.secret, None).unwrap();
    assert_eq!(content.text, "uncompressed");
}

#[test]
fn envelope_has_host_layout() {
    let mut req = request("layout");
    req.formatter = Formatter::Markdown;
    req.discussion = true;
    req.burn_after_reading = false;
    req.expiration = Expiration::OneWeek;

    let encoded = cipher().encode(&req).unwrap();
    let env = encoded.envelope.into_value();

    assert_eq!(env["v"], 2);
    assert_eq!(env["meta"], json!({ "expire": "1week" }));
    assert_eq!(env["adata"][1], "markdown");
    assert_eq!(env["adata"][2], 1);
    assert_eq!(env["adata"][3], 0);

    let spec = &env["adata"][0];
    assert_eq!(STANDARD.decode(spec[0].as_str().unwrap()).unwrap().len(), 16);
    assert_eq!(STANDARD.decode(spec[1].as_str().unwrap()).unwrap().len(), 8);
    assert_eq!(spec[2], 1_000);
    assert_eq!(spec[3], 256);
    assert_eq!(spec[4], 128);
    assert_eq!(spec[5], "aes");
    assert_eq!(spec[6], "gcm");
    assert_eq!(spec[7], "zlib");
    assert!(env["ct"].is_string());
}

#[test]
fn each_encode_uses_a_fresh_secret() {
    let cipher = cipher();
    let a = cipher.encode(&request("same text")).unwrap();
    let b = cipher.encode(&request("same text")).unwrap();

    assert_ne!(a.secret, b.secret);
    assert_ne!(a.envelope.get("ct"), b.envelope.get("ct"));
}

#[test]
fn secret_is_base58_of_32_bytes() {
    let encoded = cipher().encode(&request("x")).unwrap();
    let key = PasteKey::from_secret(&encoded.secret).unwrap();
    assert_eq!(key.as_bytes().len(), 32);
    assert!(!encoded.secret.contains(['0', 'O', 'I', 'l', '#', '?']));
}

#[test]
fn wrong_secret_fails() {
    let cipher = cipher();
    let encoded = cipher.encode(&request("private")).unwrap();
    let other = PasteKey::generate().to_secret();

    let result = cipher.decode(&encoded.envelope, &other, None);
    assert!(matches!(result, Err(CryptoError::Decryption(_))));
}

#[test]
fn missing_password_fails() {
    let cipher = cipher();
    let mut req = request("locked");
    req.password = Some("correct".into());
    let encoded = cipher.encode(&req).unwrap();

    assert!(matches!(
        cipher.decode(&encoded.envelope, &encoded.secret, None),
        Err(CryptoError::Decryption(_))
    ));
    assert!(matches!(
        cipher.decode(&encoded.envelope, &encoded.secret, Some("wrong")),
        Err(CryptoError::Decryption(_))
    ));
}

#[test]
fn tampered_adata_fails() {
    let cipher = cipher();
    let encoded = cipher.encode(&request("flags are authenticated")).unwrap();

    let mut value = encoded.envelope.into_value();
    // Flip burn-after-reading without touching the ciphertext.
    value["adata"][3] = json!(1);
    let tampered = PasteEnvelope::from_value(value).unwrap();

    assert!(matches!(
        cipher.decode(&tampered, &encoded.secret, None),
        Err(CryptoError::Decryption(_))
    ));
}

#[test]
fn hostile_iteration_count_is_refused_before_derivation() {
    let cipher = cipher();
    let encoded = cipher.encode(&request("cheap to open")).unwrap();

    let mut value = encoded.envelope.into_value();
    value["adata"][0][2] = json!(u32::MAX);
    let hostile = PasteEnvelope::from_value(value).unwrap();

    assert!(matches!(
        cipher.decode(&hostile, &encoded.secret, None),
        Err(CryptoError::MalformedEnvelope(_))
    ));
}

#[test]
fn tampered_ciphertext_fails() {
    let cipher = cipher();
    let encoded = cipher.encode(&request("integrity")).unwrap();

    let mut value = encoded.envelope.into_value();
    let mut ct = STANDARD.decode(value["ct"].as_str().unwrap()).unwrap();
    ct[0] ^= 0xFF;
    value["ct"] = json!(STANDARD.encode(ct));
    let tampered = PasteEnvelope::from_value(value).unwrap();

    assert!(cipher.decode(&tampered, &encoded.secret, None).is_err());
}

#[test]
fn missing_ciphertext_is_malformed() {
    let envelope = PasteEnvelope::from_value(json!({
        "v": 2,
        "adata": [["AAAAAAAAAAAAAAAAAAAAAA==", "AAAAAAAAAAA=", 10, 256, 128, "aes", "gcm", "none"], "plaintext", 0, 0]
    }))
    .unwrap();

    let secret = PasteKey::generate().to_secret();
    assert!(matches!(
        cipher().decode(&envelope, &secret, None),
        Err(CryptoError::MalformedEnvelope(_))
    ));
}

#[test]
fn legacy_format_is_unsupported() {
    let legacy = PasteEnvelope::from_value(json!({
        "data": "{\"iv\":\"x\",\"v\":1,\"ct\":\"y\"}",
        "meta": { "postdate": 1 }
    }))
    .unwrap();
    let secret = PasteKey::generate().to_secret();

    assert!(matches!(
        cipher().decode(&legacy, &secret, None),
        Err(CryptoError::UnsupportedVersion(1))
    ));

    let mut req = request("old host");
    req.protocol_version = 1;
    req.compression = Compression::None;
    assert!(matches!(
        cipher().encode(&req),
        Err(CryptoError::UnsupportedVersion(1))
    ));
}

#[test]
fn envelope_serializes_as_plain_object() {
    let encoded = cipher().encode(&request("wire")).unwrap();
    let text = serde_json::to_string(&encoded.envelope).unwrap();
    let back: PasteEnvelope = serde_json::from_str(&text).unwrap();

    assert_eq!(back, encoded.envelope);
    assert_eq!(back.version(), 2);
}

#[test]
fn debug_output_hides_secret() {
    let encoded = cipher().encode(&request("x")).unwrap();
    let debug = format!("{encoded:?}");
    assert!(!debug.contains(&encoded.secret));
}

// Property-based tests
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn encode_decode_always_roundtrips(
            text in ".{0,200}",
            content in proptest::collection::vec(any::<u8>(), 0..256),
            password in proptest::option::of("[a-zA-Z0-9]{1,16}"),
            zlib in any::<bool>(),
        ) {
            let cipher = PrivateBinCipher::with_iterations(10);
            let mut req = request(&text);
            req.password = password.clone();
            req.attachment = Some(Attachment::new("blob", content.clone()));
            req.compression = if zlib { Compression::Zlib } else { Compression::None };

            let encoded = cipher.encode(&req).unwrap();
            let decoded = cipher
                .decode(&encoded.envelope, &encoded.secret, password.as_deref())
                .unwrap();

            prop_assert_eq!(decoded.text, text);
            prop_assert_eq!(decoded.attachment.unwrap().content, content);
        }
    }
}
