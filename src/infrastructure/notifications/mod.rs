pub mod resend_mailer;
