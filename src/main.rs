//! # Sticker Sandbox CLI
//!
//! Usage:
//!   sticker-sandbox chat.json -o chat.png
//!   cat chat.json | sticker-sandbox
//!   sticker-sandbox --example > chat.json
//!   sticker-sandbox --themes
//!
//! Without `-o` the image is written to `sticker-sandbox-<millis>.png`.
//! Relative sticker and font paths resolve against the input file's
//! directory (or the working directory for stdin).

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use sticker_sandbox::model::Conversation;
use sticker_sandbox::style::{Theme, THEME_IDS};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_conversation_json());
        return;
    }

    if args.iter().any(|a| a == "--themes") {
        for id in THEME_IDS {
            if let Some(theme) = Theme::by_id(id) {
                println!("{:<10} {}", id, theme.label);
            }
        }
        return;
    }

    if let Err(msg) = run(&args) {
        eprintln!("✗ {}", msg);
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let input_path = args.get(1).filter(|a| !a.starts_with('-')).map(PathBuf::from);

    let input = match &input_path {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("Failed to read input file '{}': {}", path.display(), e))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("Failed to read stdin: {}", e))?;
            buf
        }
    };

    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone())
        .unwrap_or_else(sticker_sandbox::export_file_name_now);

    let conversation: Conversation = serde_json::from_str(&input)
        .map_err(|e| sticker_sandbox::ExportError::from(e).to_string())?;

    let base_dir = input_path
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let exported = sticker_sandbox::export_conversation(&conversation, Some(&base_dir))
        .map_err(|e| e.to_string())?;

    if !exported.uncovered.is_empty() {
        let chars: String = exported.uncovered.iter().collect();
        eprintln!(
            "⚠ No font covers {} character(s), left blank: {}\n  Add a face that has them to \"fonts\".",
            exported.uncovered.len(),
            chars
        );
    }

    fs::write(&output_path, &exported.png)
        .map_err(|e| format!("Failed to write '{}': {}", output_path, e))?;
    eprintln!(
        "✓ Written {}x{} PNG ({} bytes) to {}",
        exported.width,
        exported.height,
        exported.png.len(),
        output_path
    );
    Ok(())
}

fn example_conversation_json() -> &'static str {
    r##"{
  "theme": "sunrise",
  "viewport": { "width": 375, "height": 667 },
  "fonts": [],
  "messages": [
    { "id": "m-1", "author": "receive", "type": "text", "text": "早安！今天要去哪裡？", "timeLabel": "09:41" },
    { "id": "m-2", "author": "send", "type": "text", "text": "Hello\n世界", "timeLabel": "09:42" },
    { "id": "m-3", "author": "receive", "type": "text", "text": "Bubbles wrap one character at a time, so long lines and 中文 both fit.", "timeLabel": "09:42" },
    { "id": "m-4", "author": "send", "type": "text", "text": "👍", "timeLabel": "09:43" }
  ]
}
"##
}
