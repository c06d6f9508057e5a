//! Outbound notification payload and its HTML rendering.

use serde::Serialize;
use utoipa::ToSchema;

use super::email_address::EmailAddress;

/// Email handed to the transactional provider after a message is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailNotification {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

impl MailNotification {
    /// Build the notification for a stored message.
    ///
    /// `from` is the provider-facing sender identity, not the message sender;
    /// the message sender only appears inside the rendered body.
    pub fn for_message(
        from: &str,
        sender: &EmailAddress,
        to: &[EmailAddress],
        subject: &str,
        content: &str,
    ) -> Self {
        Self {
            from: from.to_owned(),
            to: to.iter().map(ToString::to_string).collect(),
            subject: subject.to_owned(),
            html: render_html(sender, to, subject, content),
        }
    }

    /// Build the email carrying a password reset link.
    pub fn for_password_reset(from: &str, to: &EmailAddress, link: &str, ttl_minutes: i64) -> Self {
        Self {
            from: from.to_owned(),
            to: vec![to.to_string()],
            subject: RESET_SUBJECT.to_owned(),
            html: render_reset_html(link, ttl_minutes),
        }
    }
}

/// Subject line of password reset emails.
pub const RESET_SUBJECT: &str = "Reset your password";

/// How the best-effort notification step ended for a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationOutcome {
    /// The provider accepted the email.
    Sent,
    /// The provider call failed; the message is stored regardless.
    Failed,
    /// No provider is configured.
    Disabled,
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Render the fixed notification template.
///
/// Addresses and subject are escaped. The body is embedded as-is because
/// messages may carry markup.
pub fn render_html(
    sender: &EmailAddress,
    to: &[EmailAddress],
    subject: &str,
    content: &str,
) -> String {
    let recipients = to
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(", ");
    format!(
        concat!(
            r#"<div style="font-family: Arial, sans-serif; padding: 20px; max-width: 600px; margin: 0 auto;">"#,
            r#"<div style="background-color: #0078d4; padding: 20px; border-radius: 8px 8px 0 0;">"#,
            r#"<h1 style="color: white; margin: 0;">New Message</h1>"#,
            "</div>",
            r#"<div style="background-color: #f8f9fa; padding: 20px; border-radius: 0 0 8px 8px;">"#,
            r#"<p style="color: #666;">From: {from}</p>"#,
            r#"<p style="color: #666;">To: {to}</p>"#,
            r#"<h2 style="color: #333;">{subject}</h2>"#,
            r#"<div style="background-color: white; padding: 15px; border-radius: 4px; margin-top: 15px;">{content}</div>"#,
            r#"<p style="color: #999; font-size: 12px; margin-top: 20px;">Sent via Outlook Clone</p>"#,
            "</div>",
            "</div>",
        ),
        from = escape_html(sender.as_ref()),
        to = escape_html(&recipients),
        subject = escape_html(subject),
        content = content,
    )
}

/// Render the password reset template. The link is escaped for both the
/// attribute and the text node.
pub fn render_reset_html(link: &str, ttl_minutes: i64) -> String {
    format!(
        concat!(
            r#"<div style="font-family: Arial, sans-serif; padding: 20px; max-width: 600px; margin: 0 auto;">"#,
            r#"<div style="background-color: #0078d4; padding: 20px; border-radius: 8px 8px 0 0;">"#,
            r#"<h1 style="color: white; margin: 0;">Reset your password</h1>"#,
            "</div>",
            r#"<div style="background-color: #f8f9fa; padding: 20px; border-radius: 0 0 8px 8px;">"#,
            r#"<p style="color: #666;">We received a request to reset your password. The link below expires in {ttl} minutes.</p>"#,
            r#"<p><a href="{link}" style="background-color: #0078d4; color: white; padding: 10px 16px; border-radius: 4px; text-decoration: none;">Reset Password</a></p>"#,
            r#"<p style="color: #999; font-size: 12px;">{link}</p>"#,
            r#"<p style="color: #999; font-size: 12px; margin-top: 20px;">If you did not ask for this, you can ignore this email.</p>"#,
            "</div>",
            "</div>",
        ),
        ttl = ttl_minutes,
        link = escape_html(link),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn sender() -> EmailAddress {
        EmailAddress::parse("a@gmail.com").expect("valid")
    }

    #[fixture]
    fn recipients() -> Vec<EmailAddress> {
        vec![
            EmailAddress::parse("b@gmail.com").expect("valid"),
            EmailAddress::parse("c@outlook.com").expect("valid"),
        ]
    }

    #[rstest]
    fn template_embeds_sender_recipients_and_body(
        sender: EmailAddress,
        recipients: Vec<EmailAddress>,
    ) {
        let html = render_html(&sender, &recipients, "Hi", "<b>bold</b>");
        assert!(html.contains("New Message"));
        assert!(html.contains("From: a@gmail.com"));
        assert!(html.contains("To: b@gmail.com, c@outlook.com"));
        assert!(html.contains(r#"<h2 style="color: #333;">Hi</h2>"#));
        assert!(html.contains("<b>bold</b>"));
    }

    #[rstest]
    fn subject_is_escaped(sender: EmailAddress, recipients: Vec<EmailAddress>) {
        let html = render_html(&sender, &recipients, "<script>x</script> & co", "body");
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt; &amp; co"));
        assert!(!html.contains("<script>"));
    }

    #[rstest]
    #[case("a&b", "a&amp;b")]
    #[case("<i>", "&lt;i&gt;")]
    #[case(r#"say "hi""#, "say &quot;hi&quot;")]
    #[case("it's", "it&#39;s")]
    #[case("plain text", "plain text")]
    fn markup_characters_are_escaped(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(escape_html(raw), expected);
    }

    #[rstest]
    fn reset_email_escapes_the_link_in_attribute_and_text() {
        let to = EmailAddress::parse("ada@gmail.com").expect("valid");
        let link = r#"https://mail.test/reset?email=ada%40gmail.com&token=abc"onmouseover="x"#;
        let mail = MailNotification::for_password_reset("Courier <c@example.com>", &to, link, 60);
        assert_eq!(mail.to, ["ada@gmail.com"]);
        assert_eq!(mail.subject, RESET_SUBJECT);
        assert!(mail.html.contains("expires in 60 minutes"));
        assert!(mail.html.contains(
            r#"href="https://mail.test/reset?email=ada%40gmail.com&amp;token=abc&quot;onmouseover=&quot;x""#
        ));
        assert!(!mail.html.contains(r#"abc"onmouseover"#));
    }

    #[rstest]
    fn notification_targets_every_recipient(sender: EmailAddress, recipients: Vec<EmailAddress>) {
        let mail = MailNotification::for_message(
            "Courier <mail@example.com>",
            &sender,
            &recipients,
            "Hi",
            "body",
        );
        assert_eq!(mail.to, ["b@gmail.com", "c@outlook.com"]);
        assert_eq!(mail.from, "Courier <mail@example.com>");
        assert_eq!(mail.subject, "Hi");
    }

    #[rstest]
    #[case(NotificationOutcome::Sent, "sent")]
    #[case(NotificationOutcome::Failed, "failed")]
    #[case(NotificationOutcome::Disabled, "disabled")]
    fn outcome_serialises_lowercase(#[case] outcome: NotificationOutcome, #[case] wire: &str) {
        assert_eq!(serde_json::to_value(outcome).expect("serialises"), wire);
    }
}
