//! Generate ids command implementation
//!
//! Prints identifiers from the same stream a run with the given seed draws
//! from, one per line.

use super::exit_code;
use crate::core::uid::UidGenerator;
use crate::domain::DEFAULT_UID_LENGTH;
use clap::Args;

/// Arguments for the generate-ids command
#[derive(Args, Debug)]
pub struct GenerateIdsArgs {
    /// Number of identifiers
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: usize,

    /// Seed of the stream
    #[arg(short, long, default_value_t = 42)]
    pub seed: u64,

    /// Identifier length
    #[arg(long, default_value_t = DEFAULT_UID_LENGTH)]
    pub length: usize,
}

impl GenerateIdsArgs {
    /// Execute the generate-ids command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        match self.generate() {
            Ok(ids) => {
                for id in ids {
                    println!("{id}");
                }
                Ok(exit_code::SUCCESS)
            }
            Err(e) => {
                eprintln!("❌ {e}");
                Ok(exit_code::CONFIGURATION)
            }
        }
    }

    fn generate(&self) -> crate::domain::Result<Vec<String>> {
        let mut generator = UidGenerator::new(self.seed, self.length)?;
        Ok(generator
            .generate(self.count)
            .into_iter()
            .map(|uid| uid.into_inner())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::uid::generate_uids;

    #[test]
    fn test_matches_library_stream() {
        let args = GenerateIdsArgs {
            count: 3,
            seed: 42,
            length: DEFAULT_UID_LENGTH,
        };
        let expected: Vec<String> = generate_uids(3, 42)
            .into_iter()
            .map(|u| u.into_inner())
            .collect();
        assert_eq!(args.generate().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_zero_length_rejected() {
        let args = GenerateIdsArgs {
            count: 1,
            seed: 1,
            length: 0,
        };
        assert_eq!(args.execute().await.unwrap(), exit_code::CONFIGURATION);
    }
}
