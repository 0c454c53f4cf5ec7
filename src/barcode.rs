use crate::epl::epl_line;

/// Code 128, no rotation, narrow 1 / wide 2, 25 dots tall, no human-readable line.
const CODE128_PARAMS: &str = "0,1,1,2,25,N";

/// Escape PPLB string data: `"` and `\` are backslash-prefixed.
///
/// This departs from embedding the serial literally only for serials that
/// contain those two characters, which would otherwise end the quoted field
/// early. flowCodes never do, so their commands stay byte-identical.
pub fn escape_data(serial: &str) -> String {
    let mut out = String::with_capacity(serial.len());
    for c in serial.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Append the barcode command carrying `serial` at `(x, y)`.
pub fn barcode_command(buf: &mut Vec<u8>, x: u32, y: u32, serial: &str) {
    epl_line(buf, &format!("B{},{},{},\"{}\"", x, y, CODE128_PARAMS, escape_data(serial)));
}
