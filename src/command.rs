// This file is part of Dressing Rooms.
//
//  Dressing Rooms is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  Dressing Rooms is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with Dressing Rooms.  If not, see <https://www.gnu.org/licenses/>.
use colored::Colorize;
use snafu::{ResultExt, Snafu};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tracing::instrument;

/// Held while a line goes to stdout so lines from concurrent customers never interleave
static STDOUT: Mutex<()> = Mutex::const_new(());

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Could not read line: {}", source))]
    FailedToReadLine { source: std::io::Error },
    #[snafu(display("Could not write line: {}", source))]
    FailedToWriteLine { source: std::io::Error },
}

async fn write_line<W>(out: &mut W, data: &str) -> Result<(), Error>
where
    W: AsyncWrite + Unpin,
{
    let line = format!("{}\n", data);
    out.write_all(line.as_bytes())
        .await
        .context(FailedToWriteLine {})?;
    out.flush().await.context(FailedToWriteLine {})
}

#[instrument]
pub async fn write(data: &str) -> Result<(), Error> {
    let _console = STDOUT.lock().await;
    write_line(&mut tokio::io::stdout(), data).await
}

/// Writes `data` followed by a blank line
#[instrument]
pub async fn writeln(data: &str) -> Result<(), Error> {
    write(&format!("{}\n", data)).await
}

/// Holds the terminal open until the user presses enter. End of input counts as enter.
#[instrument]
pub async fn wait_for_enter(prompt: &str) -> Result<(), Error> {
    write(&format!("{} {}", prompt.green(), "==>".green())).await?;
    let _ = get_line_from_stdin().await?;
    Ok(())
}

#[instrument]
pub async fn get_line_from_stdin() -> Result<Option<String>, Error> {
    let reader = BufReader::new(tokio::io::stdin());
    reader
        .lines()
        .next_line()
        .await
        .context(FailedToReadLine {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_lines_stay_whole() {
        let out = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..50)
            .map(|id| {
                let out = Arc::clone(&out);
                tokio::spawn(async move {
                    let mut out = out.lock().await;
                    write_line(&mut *out, &format!("Customer {} leaves the dressing room.", id))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let out = out.lock().await;
        let text = String::from_utf8(out.clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 50);
        assert!(lines.iter().all(|line| line.starts_with("Customer ")
            && line.ends_with(" leaves the dressing room.")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn stdout_accepts_concurrent_writers() {
        let handles: Vec<_> = (0..8)
            .map(|id| tokio::spawn(async move { writeln(&format!("line {}", id)).await }))
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
    }
}
