//! SendGrid-style transactional mail adapter.

mod sendgrid_mailer;

pub use sendgrid_mailer::SendGridMailer;
