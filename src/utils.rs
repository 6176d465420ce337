use anyhow::{Result, bail};

use crate::types::Config;

/// Printable width of a string that may contain ANSI color escapes.
/// Used to align colored columns.
pub fn plain_len(s: &str) -> usize {
    let mut n = 0;
    let mut esc = false;
    for b in s.bytes() {
        match (esc, b) {
            (true, b'm') => esc = false,
            (true, _) => {}
            (false, 0x1B) => esc = true,
            (false, _) => n += 1,
        }
    }
    n
}

/// Resolve the acting user's email: an explicit flag wins, otherwise the
/// `user` config key. Absence is a caller error, checked before any store
/// access.
pub fn resolve_user_email(flag: Option<String>, cfg: &Config) -> Result<String> {
    if let Some(email) = flag {
        return Ok(email);
    }

    match cfg.get("user") {
        Some(email) => Ok(email.to_string()),
        None => bail!("user is required: pass --user <EMAIL> or run `ironlog config set user <EMAIL>`"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colored::Colorize;

    #[test]
    fn plain_len_ignores_ansi_escapes() {
        let colored = format!("{}", "hello".red().bold());
        assert_eq!(plain_len(&colored), 5);
        assert_eq!(plain_len("plain"), 5);
    }

    #[test]
    fn user_flag_wins_over_config() {
        let mut cfg = Config::default();
        cfg.map.insert("user".into(), "cfg@example.com".into());

        let got = resolve_user_email(Some("flag@example.com".into()), &cfg).unwrap();
        assert_eq!(got, "flag@example.com");

        let got = resolve_user_email(None, &cfg).unwrap();
        assert_eq!(got, "cfg@example.com");

        assert!(resolve_user_email(None, &Config::default()).is_err());
    }
}
