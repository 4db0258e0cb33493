//! Phone command - format Thai phone numbers offline.

use clap::Args;

use rescue_core::split_phones;

/// Arguments for the phone command.
#[derive(Args)]
pub struct PhoneArgs {
    /// Phone numbers; each may be a comma-separated list
    #[arg(required = true)]
    phones: Vec<String>,
}

pub fn run(args: PhoneArgs) -> anyhow::Result<()> {
    for phone in args.phones.iter().flat_map(|p| split_phones(p)) {
        println!("{}", phone);
    }

    Ok(())
}
