//! Interactive prompts
//!
//! Line-oriented questions on a reader/writer pair. Every prompt loops until
//! it gets an acceptable answer; end of input is an error so a closed stdin
//! cannot spin forever.

use anyhow::{Result, bail};
use colored::*;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Asks questions on `input` and prints them to `output`
pub struct Prompter<R, W> {
    input: R,
    pub(crate) output: W,
}

impl Prompter<std::io::StdinLock<'static>, std::io::Stdout> {
    /// Prompter bound to the process stdin/stdout
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print a line of text
    pub fn say(&mut self, text: impl std::fmt::Display) -> Result<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    /// Read one trimmed line after printing `label`
    fn ask(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{}: ", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("input closed");
        }
        Ok(line.trim().to_string())
    }

    /// A value that may be left blank
    pub fn optional(&mut self, label: &str) -> Result<String> {
        self.ask(label)
    }

    /// A value that must not be blank
    pub fn required(&mut self, label: &str) -> Result<String> {
        loop {
            let value = self.ask(label)?;
            if !value.is_empty() {
                return Ok(value);
            }
            self.say("Value required.".yellow())?;
        }
    }

    /// A value that must not be blank, typed without echo when `hidden`
    ///
    /// Hidden input is read from the controlling terminal, so it only applies
    /// when stdin is a terminal.
    pub fn required_secret(&mut self, label: &str, hidden: bool) -> Result<String> {
        if !hidden {
            return self.required(label);
        }

        loop {
            let value = rpassword::prompt_password(format!("{}: ", label))?;
            let value = value.trim();
            if !value.is_empty() {
                return Ok(value.to_string());
            }
            self.say("Value required.".yellow())?;
        }
    }

    /// A yes/no question; blank means no
    pub fn confirm(&mut self, label: &str) -> Result<bool> {
        loop {
            match self.ask(&format!("{} [y/N]", label))?.to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" | "" => return Ok(false),
                _ => self.say("Please respond with 'y' or 'n'.".yellow())?,
            }
        }
    }

    /// Pick one of `options` by 1-based number or by name
    ///
    /// Blank picks `default`. `names` gives the extra spellings accepted for
    /// each option.
    pub fn choose<T: Copy>(
        &mut self,
        title: &str,
        options: &[(T, String)],
        default: usize,
        names: impl Fn(&T) -> Vec<String>,
    ) -> Result<T> {
        loop {
            self.say(title)?;
            for (i, (_, label)) in options.iter().enumerate() {
                let marker = if i == default { " (default)" } else { "" };
                self.say(format!("  {}) {}{}", i + 1, label, marker.dimmed()))?;
            }

            let input = self.ask(&format!("Enter choice (1-{})", options.len()))?;
            if input.is_empty() {
                return Ok(options[default].0);
            }
            if let Ok(idx) = input.parse::<usize>() {
                if (1..=options.len()).contains(&idx) {
                    return Ok(options[idx - 1].0);
                }
            }
            if let Some((value, _)) = options
                .iter()
                .find(|(value, _)| names(value).iter().any(|n| n.eq_ignore_ascii_case(&input)))
            {
                return Ok(*value);
            }

            self.say("Invalid selection, please try again.".yellow())?;
        }
    }

    /// A directory to save into; blank means the current directory
    ///
    /// The directory is created when missing.
    pub fn destination(&mut self) -> Result<PathBuf> {
        let input = self.optional(
            "Destination directory for the video (leave blank to use current directory)",
        )?;
        resolve_destination(&input)
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_path(input: &str) -> Result<PathBuf> {
    match input.strip_prefix('~') {
        Some(rest) => {
            let Some(home) = home_dir() else {
                bail!("unable to determine home directory");
            };
            Ok(home.join(rest.trim_start_matches(['/', '\\'])))
        }
        None => Ok(PathBuf::from(input)),
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

/// Turn a destination answer into an existing directory
pub fn resolve_destination(input: &str) -> Result<PathBuf> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(std::env::current_dir()?);
    }

    let dir = expand_path(input)?;
    std::fs::create_dir_all(&dir)
        .map_err(|e| anyhow::anyhow!("unable to create destination directory {}: {}", dir.display(), e))?;
    Ok(dir)
}
