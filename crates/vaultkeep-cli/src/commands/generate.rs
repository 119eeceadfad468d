//! Password and master key generation commands.

use clap::Args;
use vaultkeep_core::Config;
use vaultkeep_secrets::{GenerationPolicy, MasterKey, SecretGenerator};

/// Generate command arguments. Unset flags fall back to the configured policy.
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Number of characters
    #[arg(short, long)]
    pub length: Option<usize>,

    /// Exclude uppercase letters
    #[arg(long)]
    pub no_upper: bool,

    /// Exclude lowercase letters
    #[arg(long)]
    pub no_lower: bool,

    /// Exclude digits
    #[arg(long)]
    pub no_digits: bool,

    /// Exclude symbols
    #[arg(long)]
    pub no_symbols: bool,

    /// How many passwords to print
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: usize,
}

impl GenerateArgs {
    /// Combine the flags with the configured defaults.
    pub fn policy(&self, config: &Config) -> GenerationPolicy {
        let mut policy = GenerationPolicy::from(&config.generator);
        if let Some(length) = self.length {
            policy.length = length;
        }
        policy.use_upper &= !self.no_upper;
        policy.use_lower &= !self.no_lower;
        policy.use_digits &= !self.no_digits;
        policy.use_symbols &= !self.no_symbols;
        policy
    }
}

/// Run the generate command.
pub fn run(args: GenerateArgs, config: &Config) -> anyhow::Result<()> {
    let policy = args.policy(config);
    let generator = SecretGenerator::default();
    for _ in 0..args.count.max(1) {
        let secret = generator.generate(&policy)?;
        println!("{}", secret.expose_secret());
    }
    Ok(())
}

/// Run the keygen command.
pub fn keygen() -> anyhow::Result<()> {
    let key = MasterKey::generate()?;
    eprintln!("Store this key somewhere safe. It cannot be recovered.");
    println!("{}", key.to_hex().expose_secret());
    Ok(())
}
