//! Utility functions: tracing setup, MIME envelope and address parsing.

use mailparse::{MailAddr, MailHeaderMap, ParsedMail, addrparse};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize pretty CLI logging.
pub fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  fmt()
    .with_env_filter(filter)
    .with_target(false)
    .pretty()
    .init();
}

/// Structured result of decoding one raw MIME payload. `from` and `to` are
/// the raw header values; run them through [`parse_address_list`] for bare
/// addresses.
#[derive(Debug)]
pub struct Envelope {
  pub from: String,
  pub to: String,
  pub subject: String,
  pub text_body: String,
  pub html_body: String,
}

/// Why a payload was rejected by the envelope parser.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
  #[error("invalid mime: {0}")]
  Mime(#[from] mailparse::MailParseError),
  #[error("missing {0}")]
  MissingField(&'static str),
}

/// Decode a raw MIME payload into an [`Envelope`].
///
/// Transfer encodings are decoded and multipart trees walked for the first
/// text/plain and text/html parts. Every envelope field must come out
/// non-empty: a message without a subject or with only one alternative part
/// is rejected rather than stored half-filled.
pub fn parse_envelope(raw: &[u8]) -> Result<Envelope, EnvelopeError> {
  let parsed = mailparse::parse_mail(raw)?;

  let from = header_value(&parsed, "From").ok_or(EnvelopeError::MissingField("from header"))?;
  let to = header_value(&parsed, "To").ok_or(EnvelopeError::MissingField("to header"))?;
  let subject = header_value(&parsed, "Subject").ok_or(EnvelopeError::MissingField("subject"))?;

  let (text, html) = extract_bodies(&parsed);
  let text_body = text
    .filter(|b| !b.trim().is_empty())
    .ok_or(EnvelopeError::MissingField("text body"))?;
  let html_body = html
    .filter(|b| !b.trim().is_empty())
    .ok_or(EnvelopeError::MissingField("html body"))?;

  Ok(Envelope {
    from,
    to,
    subject,
    text_body,
    html_body,
  })
}

fn header_value(parsed: &ParsedMail<'_>, key: &str) -> Option<String> {
  parsed
    .headers
    .get_first_value(key)
    .filter(|v| !v.trim().is_empty())
}

/// Walk a MIME tree for the first text/plain and text/html bodies.
fn extract_bodies(parsed: &ParsedMail<'_>) -> (Option<String>, Option<String>) {
  if parsed.subparts.is_empty() {
    let body = parsed.get_body().unwrap_or_default();
    return match parsed.ctype.mimetype.as_str() {
      "text/plain" => (Some(body), None),
      "text/html" => (None, Some(body)),
      _ => (None, None),
    };
  }
  let mut text = None;
  let mut html = None;
  for part in &parsed.subparts {
    let (t, h) = extract_bodies(part);
    if text.is_none() {
      text = t;
    }
    if html.is_none() {
      html = h;
    }
  }
  (text, html)
}

/// Extract bare mailbox addresses from one raw address-list header, in
/// order, with display names and angle brackets stripped and RFC 5322
/// groups flattened. An empty or unparsable header yields no addresses;
/// the message still goes through, it just fans out to nothing for that
/// role.
pub fn parse_address_list(header: &str) -> Vec<String> {
  if header.trim().is_empty() {
    return Vec::new();
  }
  let parsed = match addrparse(header) {
    Ok(list) => list,
    Err(e) => {
      warn!("unparsable address list: {e}");
      return Vec::new();
    }
  };
  let mut addresses = Vec::new();
  for entry in parsed.iter() {
    match entry {
      MailAddr::Single(single) => addresses.push(single.addr.clone()),
      MailAddr::Group(group) => addresses.extend(group.addrs.iter().map(|a| a.addr.clone())),
    }
  }
  addresses
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn address_list_strips_display_names() {
    let addrs = parse_address_list("Alice <a@x.com>, b@y.com");
    assert_eq!(addrs, vec!["a@x.com".to_string(), "b@y.com".to_string()]);
  }

  #[test]
  fn address_list_flattens_groups() {
    let addrs = parse_address_list("team: a@x.com, b@y.com;");
    assert_eq!(addrs, vec!["a@x.com".to_string(), "b@y.com".to_string()]);
  }

  #[test]
  fn blank_or_unparsable_address_lists_yield_nothing() {
    assert!(parse_address_list("").is_empty());
    assert!(parse_address_list("   ").is_empty());
    assert!(parse_address_list("<").is_empty());
  }

  #[test]
  fn empty_group_yields_nothing() {
    assert!(parse_address_list("undisclosed-recipients:;").is_empty());
  }

  const ALTERNATIVE: &str = concat!(
    "From: Alice <a@x.com>\r\n",
    "To: b@dom.com\r\n",
    "Subject: =?utf-8?q?Gr=C3=BC=C3=9Fe?=\r\n",
    "MIME-Version: 1.0\r\n",
    "Content-Type: multipart/alternative; boundary=SEP\r\n",
    "\r\n",
    "--SEP\r\n",
    "Content-Type: text/plain; charset=utf-8\r\n",
    "Content-Transfer-Encoding: quoted-printable\r\n",
    "\r\n",
    "Gr=C3=BC=C3=9Fe aus Berlin\r\n",
    "--SEP\r\n",
    "Content-Type: text/html\r\n",
    "\r\n",
    "<p>Hallo</p>\r\n",
    "--SEP--\r\n",
  );

  #[test]
  fn envelope_decodes_multipart_alternative() {
    let env = parse_envelope(ALTERNATIVE.as_bytes()).expect("parse");
    assert_eq!(env.from, "Alice <a@x.com>");
    assert_eq!(env.to, "b@dom.com");
    assert_eq!(env.subject, "Grüße");
    assert!(env.text_body.contains("Grüße aus Berlin"));
    assert!(env.html_body.contains("<p>Hallo</p>"));
  }

  #[test]
  fn envelope_rejects_missing_subject() {
    let eml = ALTERNATIVE.replace("Subject: =?utf-8?q?Gr=C3=BC=C3=9Fe?=\r\n", "");
    let err = parse_envelope(eml.as_bytes()).unwrap_err();
    assert!(matches!(err, EnvelopeError::MissingField("subject")));
  }

  #[test]
  fn envelope_rejects_single_part_messages() {
    let eml = concat!(
      "From: a@x.com\r\n",
      "To: b@dom.com\r\n",
      "Subject: plain only\r\n",
      "Content-Type: text/plain\r\n",
      "\r\n",
      "no html here\r\n",
    );
    let err = parse_envelope(eml.as_bytes()).unwrap_err();
    assert!(matches!(err, EnvelopeError::MissingField("html body")));
  }
}
