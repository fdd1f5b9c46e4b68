use std::io::{BufRead, Write};

use anyhow::{Context, Result, anyhow};

/// Line-oriented question/answer over any reader and writer, so workflows can
/// run against stdin/stdout or scripted input.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{message}").context("failed to write to terminal")
    }

    /// Reads one line without its terminator; `None` once input is closed.
    pub fn read_line(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}").context("failed to write to terminal")?;
        self.output.flush().context("failed to flush terminal")?;

        let mut buf = String::new();
        let read = self
            .input
            .read_line(&mut buf)
            .context("failed to read input")?;
        if read == 0 {
            return Ok(None);
        }
        let trimmed_len = buf.trim_end_matches(['\n', '\r']).len();
        buf.truncate(trimmed_len);
        Ok(Some(buf))
    }

    pub fn line(&mut self, label: &str) -> Result<String> {
        self.read_line(label)?
            .ok_or_else(|| anyhow!("input closed while waiting for an answer"))
    }

    /// Asks `label (y, n): `; only `y`/`yes` count as yes.
    pub fn confirm(&mut self, label: &str) -> Result<bool> {
        let answer = self.line(&format!("{label} (y, n): "))?;
        Ok(matches!(
            answer.trim().to_ascii_lowercase().as_str(),
            "y" | "yes"
        ))
    }

    /// Re-asks until the answer is an integer inside `min..=max`.
    pub fn number_in(&mut self, label: &str, min: u32, max: u32, invalid: &str) -> Result<u32> {
        loop {
            let answer = self.line(label)?;
            match answer.trim().parse::<u32>() {
                Ok(value) if (min..=max).contains(&value) => return Ok(value),
                _ => self.say(invalid)?,
            }
        }
    }

    /// Offers `options` as `1- ..`, with `0- Nope/Exit`. Returns the chosen
    /// index, or `None` for 0.
    pub fn choose(&mut self, options: &[String]) -> Result<Option<usize>> {
        self.say("0- Nope/Exit")?;
        for (idx, option) in options.iter().enumerate() {
            self.say(&format!("{}- {option}", idx + 1))?;
        }
        loop {
            let answer = self.line("Select: ")?;
            let Ok(selected) = answer.trim().parse::<usize>() else {
                self.say("Invalid selection, must be int!")?;
                continue;
            };
            if selected == 0 {
                return Ok(None);
            }
            if selected > options.len() {
                self.say("Invalid selection, try again")?;
                continue;
            }
            return Ok(Some(selected - 1));
        }
    }
}

#[cfg(test)]
pub(crate) fn scripted(input: &str) -> Prompter<std::io::Cursor<Vec<u8>>, Vec<u8>> {
    Prompter::new(std::io::Cursor::new(input.as_bytes().to_vec()), Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(prompter: &mut Prompter<std::io::Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8_lossy(prompter.output()).into_owned()
    }

    #[test]
    fn read_line_strips_terminators_and_reports_eof() {
        let mut prompter = scripted("first\r\nsecond\n");
        assert_eq!(prompter.read_line("> ").expect("read"), Some("first".to_string()));
        assert_eq!(prompter.read_line("> ").expect("read"), Some("second".to_string()));
        assert_eq!(prompter.read_line("> ").expect("read"), None);
        assert!(prompter.line("> ").is_err());
    }

    #[test]
    fn confirm_accepts_only_yes() {
        let mut prompter = scripted("y\nYES\nn\nmaybe\n");
        assert!(prompter.confirm("Done?").expect("answer"));
        assert!(prompter.confirm("Done?").expect("answer"));
        assert!(!prompter.confirm("Done?").expect("answer"));
        assert!(!prompter.confirm("Done?").expect("answer"));
        assert!(transcript(&mut prompter).contains("Done? (y, n): "));
    }

    #[test]
    fn number_in_reprompts_until_valid() {
        let mut prompter = scripted("eleven\n11\n7\n");
        let value = prompter
            .number_in("Work happiness: ", 0, 10, "Invalid happiness!")
            .expect("number");
        assert_eq!(value, 7);
        assert_eq!(transcript(&mut prompter).matches("Invalid happiness!").count(), 2);
    }

    #[test]
    fn choose_handles_exit_and_bad_input() {
        let options = vec!["Dune".to_string(), "Dune Messiah".to_string()];
        let mut prompter = scripted("x\n3\n2\n");
        assert_eq!(prompter.choose(&options).expect("choice"), Some(1));
        let out = transcript(&mut prompter);
        assert!(out.contains("Invalid selection, must be int!"));
        assert!(out.contains("Invalid selection, try again"));
        assert!(out.contains("2- Dune Messiah"));

        let mut prompter = scripted("0\n");
        assert_eq!(prompter.choose(&options).expect("choice"), None);
    }
}
