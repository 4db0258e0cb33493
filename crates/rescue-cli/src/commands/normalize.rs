//! Normalize command - clean up pasted or typed text offline.

use std::io::Read;

use clap::Args;

use rescue_core::normalize_text;

/// Arguments for the normalize command.
#[derive(Args)]
pub struct NormalizeArgs {
    /// Text to normalize (reads stdin when omitted)
    text: Option<String>,
}

pub fn run(args: NormalizeArgs) -> anyhow::Result<()> {
    let input = match args.text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    println!("{}", normalize_text(&input));

    Ok(())
}
