//! bMessage envelopes for GetMessage and PushMessage.

mod common;

use common::{sms_message, submit_pdu, MasConfigBuilder};
use mapcore::bmessage::codec::{escape_text, unescape_text};
use mapcore::bmessage::{BMessage, Body, BodyMarker, Charset, SmsBody, VCard};
use mapcore::handle::MessageType;
use mapcore::BMessageError;

/// Value of the LENGTH header and the bytes between the header line and
/// `END:BBODY`.
fn length_and_body(encoded: &[u8]) -> (usize, usize) {
    let text = std::str::from_utf8(encoded).unwrap();
    let start = text.find("LENGTH:").unwrap() + "LENGTH:".len();
    let line_end = start + text[start..].find("\r\n").unwrap();
    let length = text[start..line_end].parse().unwrap();
    let body_start = line_end + 2;
    let body_end = text.find("END:BBODY").unwrap();
    (length, body_end - body_start)
}

#[test]
fn test_length_covers_all_fragments() {
    let mut msg = sms_message("sent", "5550100", "5550199");
    msg.set_sms_pdus(vec![submit_pdu(&[0x0b, 0x91]), submit_pdu(&[0x41; 20])]);

    let (length, body) = length_and_body(&msg.encode().unwrap());
    assert_eq!(length, body);
    // Two hex fragments: 1 + 4 and 1 + 22 octets.
    assert_eq!(length, 10 + 22 + 46 + 22);
}

#[test]
fn test_length_of_text_body_counts_escaped_bytes() {
    let mut msg = sms_message("inbox", "5550100", "5550199");
    msg.set_sms_text("über END:MSG");

    let (length, body) = length_and_body(&msg.encode().unwrap());
    assert_eq!(length, body);
    assert_eq!(length, "über /END:MSG".len() + 22);
}

#[test]
fn test_pushed_text_message() {
    let pushed = concat!(
        "BEGIN:BMSG\r\n",
        "VERSION:1.0\r\n",
        "STATUS:UNREAD\r\n",
        "TYPE:SMS_GSM\r\n",
        "FOLDER:\r\n",
        "BEGIN:VCARD\r\n",
        "VERSION:2.1\r\n",
        "N:\r\n",
        "END:VCARD\r\n",
        "BEGIN:BENV\r\n",
        "BEGIN:VCARD\r\n",
        "VERSION:2.1\r\n",
        "N:Doe;Jane\r\n",
        "TEL:+49 170 1234\r\n",
        "END:VCARD\r\n",
        "BEGIN:BBODY\r\n",
        "CHARSET:UTF-8\r\n",
        "LANGUAGE:GERMAN\r\n",
        "LENGTH:41\r\n",
        "BEGIN:MSG\r\n",
        "Bis gleich\r\n",
        "/END:MSG ist kein Ende\r\n",
        "END:MSG\r\n",
        "END:BBODY\r\n",
        "END:BENV\r\n",
        "END:BMSG\r\n",
    );

    let msg = BMessage::parse(pushed.as_bytes(), Charset::Utf8).unwrap();
    assert_eq!(msg.message_type(), MessageType::SmsGsm);
    assert_eq!(msg.folder(), "");
    assert_eq!(msg.language(), Some("GERMAN"));
    assert_eq!(msg.marker(), &BodyMarker::Charset("UTF-8".to_string()));
    assert_eq!(msg.recipients().len(), 1);
    assert_eq!(msg.recipients()[0].name(), "Doe;Jane");
    assert_eq!(msg.recipients()[0].first_phone_number(), Some("+49 170 1234"));
    assert_eq!(msg.body_text(), Some("Bis gleich\r\nEND:MSG ist kein Ende"));
}

#[test]
fn test_pushed_native_message() {
    let pushed = concat!(
        "BEGIN:BMSG\r\n",
        "VERSION:1.0\r\n",
        "TYPE:SMS_GSM\r\n",
        "BEGIN:BENV\r\n",
        "BEGIN:BBODY\r\n",
        "ENCODING:G-7BIT\r\n",
        "LENGTH:32\r\n",
        "BEGIN:MSG\r\n",
        "0001000b91\r\n",
        "END:MSG\r\n",
        "END:BBODY\r\n",
        "END:BENV\r\n",
        "END:BMSG\r\n",
    );

    let msg = BMessage::parse(pushed.as_bytes(), Charset::Native).unwrap();
    let Body::Sms(SmsBody::Pdus(pdus)) = msg.body() else {
        panic!("expected PDUs, got {:?}", msg.body());
    };
    assert_eq!(pdus.len(), 1);
    assert_eq!(pdus[0].sc_address(), &[0x00]);
    assert_eq!(pdus[0].data(), &[0x01, 0x00, 0x0b, 0x91]);
    assert_eq!(pdus[0].encoding(), "G-7BIT");
}

#[test]
fn test_missing_charset_falls_back_to_config() {
    let mut msg = sms_message("outbox", "5550100", "5550199");
    msg.set_sms_pdus(vec![submit_pdu(&[0x0b, 0x91])]);
    let encoded = msg.encode().unwrap();

    let native = MasConfigBuilder::new().charset(Charset::Native).build();
    let parsed = BMessage::parse_with_config(&encoded, None, &native).unwrap();
    assert_eq!(parsed.body(), msg.body());

    // UTF-8 keeps the hex as text.
    let utf8 = MasConfigBuilder::new().build();
    let parsed = BMessage::parse_with_config(&encoded, None, &utf8).unwrap();
    assert_eq!(parsed.body_text(), Some("0001000b91"));

    // An explicit request parameter wins over the configuration.
    let parsed = BMessage::parse_with_config(&encoded, Some(Charset::Native), &utf8).unwrap();
    assert_eq!(parsed.body(), msg.body());
}

#[test]
fn test_rejected_pushes() {
    let cases: &[(&str, Charset, &str)] = &[
        ("", Charset::Utf8, "too short"),
        ("BEGIN:VCARD\r\n", Charset::Utf8, "BEGIN:BMSG"),
        (
            "BEGIN:BMSG\r\nVERSION:1.0\r\nTYPE:EMAIL\r\nBEGIN:BENV\r\n",
            Charset::Native,
            "native charset",
        ),
        (
            "BEGIN:BMSG\r\nVERSION:1.0\r\nTYPE:FAX\r\nBEGIN:BENV\r\n",
            Charset::Utf8,
            "FAX",
        ),
        (
            "BEGIN:BMSG\r\nVERSION:1.0\r\nTYPE:SMS_GSM\r\nBEGIN:BENV\r\nBEGIN:BBODY\r\n\
             LENGTH:22\r\nBEGIN:MSG\r\nnever closed\r\n",
            Charset::Utf8,
            "END:MSG",
        ),
        (
            "BEGIN:BMSG\r\nVERSION:1.0\r\nTYPE:SMS_GSM\r\nBEGIN:BENV\r\nBEGIN:BBODY\r\n\
             LENGTH:22\r\nBEGIN:MSG\r\n0x12\r\nEND:MSG\r\nEND:BBODY\r\n",
            Charset::Native,
            "non-hex",
        ),
    ];

    for (input, charset, expected) in cases {
        let err = BMessage::parse(input.as_bytes(), *charset).unwrap_err();
        assert!(
            err.to_string().contains(expected),
            "input {:?}: error '{}' does not mention '{}'",
            input,
            err,
            expected
        );
    }
}

#[test]
fn test_invalid_utf8_push() {
    let err = BMessage::parse(b"BEGIN:BMSG\r\n\xc3\x28\r\n", Charset::Utf8).unwrap_err();
    assert!(matches!(err, BMessageError::Encoding(_)));
}

#[test]
fn test_email_round_trip() {
    let content = "From: ann@example.com\r\nSubject: lunch\r\n\r\nEND:MSG at noon?";

    let mut msg = BMessage::new(MessageType::Email);
    msg.set_folder("inbox");
    msg.add_originator(VCard::v30("Ann", "Ann", &[], &["ann@example.com"]));
    msg.add_recipient(VCard::v30("Bob", "Bob", &[], &["bob@example.com"]));
    msg.set_mime_text(content);

    let parsed = BMessage::parse(&msg.encode().unwrap(), Charset::Utf8).unwrap();
    assert_eq!(parsed.body_text(), Some(content));
    assert_eq!(parsed.originators()[0].email_addresses(), ["ann@example.com"]);
    assert_eq!(parsed.marker(), &BodyMarker::Encoding("8BIT".to_string()));
}

#[test]
fn test_escaping_is_reversible() {
    for text in ["END:MSG", "a\r\nEND:MSG\r\n", "/END:MSG", "no marker"] {
        assert_eq!(unescape_text(&escape_text(text)), text);
    }
}
