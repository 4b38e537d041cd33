//! HTML bodies for patient emails.

/// Escapes text interpolated into HTML.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Sent right after booking. `time` is already formatted for display.
pub fn confirmation_email(patient_name: &str, doctor_name: &str, time: &str, link: &str) -> String {
    format!(
        r#"
    <div style="font-family: sans-serif; padding: 20px; color: #333;">
      <h1 style="color: #2563eb;">Appointment Confirmed</h1>
      <p>Hello <strong>{patient}</strong>,</p>
      <p>Your appointment with <strong>Dr. {doctor}</strong> has been booked.</p>
      <p style="font-size: 18px; font-weight: bold;">&#128197; {time}</p>
      <p>Please wait for the doctor to accept your request.</p>
      <br />
      <a href="{link}" style="background-color: #2563eb; color: white; padding: 10px 20px; text-decoration: none; border-radius: 5px;">View Dashboard</a>
    </div>
  "#,
        patient = escape_html(patient_name),
        doctor = escape_html(doctor_name),
        time = escape_html(time),
        link = escape_html(link),
    )
}

pub fn reminder_email(patient_name: &str, time: &str, link: &str) -> String {
    format!(
        r#"
    <div style="font-family: sans-serif; padding: 20px; color: #333;">
      <h1 style="color: #d97706;">Appointment Reminder</h1>
      <p>Hello <strong>{patient}</strong>,</p>
      <p>This is a reminder for your appointment coming up soon.</p>
      <p style="font-size: 18px; font-weight: bold;">&#128197; {time}</p>
      <br />
      <a href="{link}" style="background-color: #d97706; color: white; padding: 10px 20px; text-decoration: none; border-radius: 5px;">Join Video Call</a>
    </div>
  "#,
        patient = escape_html(patient_name),
        time = escape_html(time),
        link = escape_html(link),
    )
}
