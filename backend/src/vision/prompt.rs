/// Instruction sent with every cap photo. The wording is fixed; it is not a
/// request parameter and there is no user-facing way to change it.
pub const SERIAL_PROMPT: &str = r#"You are an advanced AI reading a serial code on a bottle cap.
The text is in a DOT-MATRIX font.

YOUR TASK: Extract the exactly 12-character alphanumeric code.

CORRECTION RULES:
1. '7' vs 'Z': In this font, '7' has a curved top like 'Z'. Unless clearly 'Z', interpret as '7'.
2. '6' vs 'G': '6' often looks like 'G'. Check closely.
3. 'W' vs 'I': 'W' is wide, do not mistake for 'I'.

OUTPUT FORMAT:
- Exact 12 characters (A-Z, 0-9).
- Ignore "P Bev", "21", "HDPE".
- Output ONLY the code."#;
