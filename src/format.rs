//! Status decoration for terminal output.
//!
//! Every decorated string has the shape `<color>[<marker>] <text><reset>`
//! (or `[<marker>] <text>` when color is off), so the original text can always
//! be recovered with [`strip`].

const GREEN: &str = "\x1b[92m";
const YELLOW: &str = "\x1b[93m";
const RED: &str = "\x1b[91m";
const RESET: &str = "\x1b[0m";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Ok,
    Warn,
    Fail,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Ok, Status::Warn, Status::Fail];

    pub fn marker(&self) -> &'static str {
        match self {
            Status::Ok => "[+] ",
            Status::Warn => "[~] ",
            Status::Fail => "[-] ",
        }
    }

    fn color(&self) -> &'static str {
        match self {
            Status::Ok => GREEN,
            Status::Warn => YELLOW,
            Status::Fail => RED,
        }
    }

    pub fn decorate(&self, text: &str, color: bool) -> String {
        if color {
            format!("{}{}{}{}", self.color(), self.marker(), text, RESET)
        } else {
            format!("{}{}", self.marker(), text)
        }
    }
}

pub fn ok(text: &str) -> String {
    Status::Ok.decorate(text, true)
}

pub fn warn(text: &str) -> String {
    Status::Warn.decorate(text, true)
}

pub fn fail(text: &str) -> String {
    Status::Fail.decorate(text, true)
}

/// Remove a status decoration (colored or plain). Undecorated input is
/// returned unchanged.
pub fn strip(decorated: &str) -> &str {
    for status in Status::ALL {
        let colored = decorated
            .strip_prefix(status.color())
            .and_then(|rest| rest.strip_prefix(status.marker()))
            .and_then(|rest| rest.strip_suffix(RESET));
        if let Some(text) = colored {
            return text;
        }
    }
    for status in Status::ALL {
        if let Some(text) = decorated.strip_prefix(status.marker()) {
            return text;
        }
    }
    decorated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_escape_sequences() {
        assert_eq!(ok("PASS"), "\x1b[92m[+] PASS\x1b[0m");
        assert_eq!(warn("SKIP"), "\x1b[93m[~] SKIP\x1b[0m");
        assert_eq!(fail("FAIL"), "\x1b[91m[-] FAIL\x1b[0m");
    }

    #[test]
    fn test_strip_recovers_text() {
        let samples = [
            "",
            "plain",
            "x1.00    sum_iter",
            "[+] already marked",
            "trailing \x1b[0m",
            "ünïcödé µs",
        ];
        for text in samples {
            assert_eq!(strip(&ok(text)), text);
            assert_eq!(strip(&warn(text)), text);
            assert_eq!(strip(&fail(text)), text);
        }
    }

    #[test]
    fn test_strip_plain_decoration() {
        for status in Status::ALL {
            let plain = status.decorate("label", false);
            assert!(!plain.contains('\x1b'));
            assert_eq!(strip(&plain), "label");
        }
    }

    #[test]
    fn test_strip_undecorated_is_identity() {
        assert_eq!(strip("nothing here"), "nothing here");
    }
}
