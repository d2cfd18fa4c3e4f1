/// Converts between bind/result values and the text form mart works in.
pub(crate) struct Value;

impl Value {
    /// Strings are sent as bytes and converted by the server.
    pub(crate) fn bind(value: &str) -> mysql_async::Value {
        mysql_async::Value::Bytes(value.as_bytes().to_vec())
    }

    /// Renders a result value as text; `NULL` becomes `None`.
    pub(crate) fn into_text(value: mysql_async::Value) -> Option<String> {
        use mysql_async::Value::*;

        match value {
            NULL => None,
            Bytes(bytes) => Some(match String::from_utf8(bytes) {
                Ok(s) => s,
                Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
            }),
            Int(value) => Some(value.to_string()),
            UInt(value) => Some(value.to_string()),
            Float(value) => Some(value.to_string()),
            Double(value) => Some(value.to_string()),
            Date(year, month, day, hour, minute, second, 0) => Some(format!(
                "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
            )),
            Date(year, month, day, hour, minute, second, micros) => Some(format!(
                "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}.{micros:06}"
            )),
            Time(negative, days, hours, minutes, seconds, micros) => {
                let sign = if negative { "-" } else { "" };
                let hours = u32::from(hours) + days * 24;
                let mut text = format!("{sign}{hours:02}:{minutes:02}:{seconds:02}");
                if micros > 0 {
                    text.push_str(&format!(".{micros:06}"));
                }
                Some(text)
            }
        }
    }
}
