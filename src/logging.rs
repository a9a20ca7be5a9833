use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use env_logger::{Env, Target};

/// Copies every log line to stderr as well as the log file.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let _ = io::stderr().write_all(buf);
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = io::stderr().flush();
        self.file.flush()
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Format a record the way the log file has always looked:
/// `2024-05-01 12:00:00 - target - INFO - message`.
fn format_line(timestamp: &str, target: &str, level: log::Level, message: &str) -> String {
    format!("{timestamp} - {target} - {level} - {message}")
}

/// Log to `log_path`, mirrored to stderr when `verbose`.
/// Falls back to stderr alone when the file cannot be opened.
pub fn init(log_path: &Path, verbose: bool) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format(|buf, record| {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(
            buf,
            "{}",
            format_line(
                &timestamp.to_string(),
                record.target(),
                record.level(),
                &record.args().to_string()
            )
        )
    });

    let file_error = match open_log_file(log_path) {
        Ok(file) if verbose => {
            builder.target(Target::Pipe(Box::new(Tee { file })));
            None
        }
        Ok(file) => {
            builder.target(Target::Pipe(Box::new(file)));
            None
        }
        Err(err) => {
            builder.target(Target::Stderr);
            Some(err)
        }
    };

    if builder.try_init().is_err() {
        return;
    }
    if let Some(err) = file_error {
        log::warn!(
            "logging: cannot open {} ({err}), logging to stderr",
            log_path.display()
        );
    }
}
