//! Command-line arguments.

use accounted_crypto::{
    AgreedKeys, Conversation, DerivedKeys, KeyPair, KeyProvider, PublicKey, SymmetricKey,
    import_public_key,
};
use clap::{Args, Parser, Subcommand};

use crate::error::CliError;

/// Accounted message encryption tool
#[derive(Parser, Debug)]
#[command(name = "accounted-crypt")]
#[command(about = "Encrypt, decrypt and inspect Accounted chat messages")]
#[command(version)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Operation to perform
    #[command(subcommand)]
    pub command: Command,
}

/// Operations.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a P-256 key pair for key agreement
    Keygen,

    /// Encrypt a message into a storage envelope
    Encrypt {
        /// Key selection
        #[command(flatten)]
        keys: KeyArgs,

        /// Message text (read from stdin if omitted)
        plaintext: Option<String>,
    },

    /// Decrypt a storage envelope, failing on plaintext or wrong key
    Decrypt {
        /// Key selection
        #[command(flatten)]
        keys: KeyArgs,

        /// Stored content (read from stdin if omitted)
        stored: Option<String>,
    },

    /// Show stored content the way a chat UI would
    Render {
        /// Key selection
        #[command(flatten)]
        keys: KeyArgs,

        /// Stored content (read from stdin if omitted)
        stored: Option<String>,
    },

    /// Report whether stored content is an encrypted envelope
    Inspect {
        /// Stored content (read from stdin if omitted)
        stored: Option<String>,
    },
}

/// How to obtain the conversation key.
#[derive(Args, Debug, Clone, Default)]
pub struct KeyArgs {
    /// Direct chat between two user ids (any order)
    #[arg(long, num_args = 2, value_names = ["USER_A", "USER_B"], conflicts_with_all = ["group", "private_key"])]
    pub direct: Option<Vec<String>>,

    /// Group chat id
    #[arg(long, conflicts_with = "private_key")]
    pub group: Option<String>,

    /// Also try this author's legacy group key when decrypting (repeatable)
    #[arg(long, requires = "group")]
    pub legacy_author: Vec<String>,

    /// Own base64 PKCS#8 private key, for key agreement
    #[arg(long, requires = "peer_key")]
    pub private_key: Option<String>,

    /// Peer's base64 SPKI public key, for key agreement
    #[arg(long, requires = "private_key")]
    pub peer_key: Option<String>,
}

impl KeyArgs {
    /// Resolve the arguments into a key provider.
    pub fn select(&self) -> Result<SelectedKeys, CliError> {
        if let Some(users) = &self.direct {
            let [user_a, user_b] = users.as_slice() else {
                return Err(CliError::Usage("--direct takes exactly two user ids".to_string()));
            };
            return Ok(SelectedKeys::Derived(DerivedKeys::new(Conversation::direct(
                user_a.as_str(),
                user_b.as_str(),
            ))));
        }

        if let Some(group_id) = &self.group {
            let provider = self
                .legacy_author
                .iter()
                .fold(DerivedKeys::new(Conversation::group(group_id.as_str())), |keys, author| {
                    keys.with_legacy_author(author.as_str())
                });
            return Ok(SelectedKeys::Derived(provider));
        }

        if let (Some(private_key), Some(peer_key)) = (&self.private_key, &self.peer_key) {
            let mine = KeyPair::import_private_key(private_key)?;
            let theirs = import_public_key(peer_key)?;
            return Ok(SelectedKeys::Agreed { mine, theirs });
        }

        Err(CliError::Usage(
            "choose one of --direct, --group, or --private-key with --peer-key".to_string(),
        ))
    }
}

/// Key provider chosen on the command line.
#[derive(Debug)]
pub enum SelectedKeys {
    /// Identifier-based keys
    Derived(DerivedKeys),
    /// ECDH-agreed keys
    Agreed {
        /// Own key pair
        mine: KeyPair,
        /// Peer's public key
        theirs: PublicKey,
    },
}

impl KeyProvider for SelectedKeys {
    fn encryption_key(&self) -> accounted_crypto::Result<SymmetricKey> {
        match self {
            Self::Derived(keys) => keys.encryption_key(),
            Self::Agreed { mine, theirs } => AgreedKeys::new(mine, theirs.clone()).encryption_key(),
        }
    }

    fn fallback_keys(
        &self,
    ) -> Box<dyn Iterator<Item = accounted_crypto::Result<SymmetricKey>> + '_> {
        match self {
            Self::Derived(keys) => keys.fallback_keys(),
            Self::Agreed { .. } => Box::new(std::iter::empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use accounted_crypto::generate_key_pair;

    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("accounted-crypt").chain(args.iter().copied()))
    }

    fn keys_of(cli: Cli) -> KeyArgs {
        match cli.command {
            Command::Encrypt { keys, .. }
            | Command::Decrypt { keys, .. }
            | Command::Render { keys, .. } => keys,
            other => panic!("no key arguments in {other:?}"),
        }
    }

    #[test]
    fn direct_selects_conversation() {
        let cli = parse(&["encrypt", "--direct", "bob", "alice", "hi"]).unwrap();

        let SelectedKeys::Derived(keys) = keys_of(cli).select().unwrap() else {
            panic!("expected derived keys");
        };
        assert_eq!(keys.conversation(), &Conversation::direct("bob", "alice"));
    }

    #[test]
    fn group_collects_legacy_authors() {
        let cli = parse(&[
            "decrypt",
            "--group",
            "g1",
            "--legacy-author",
            "u1",
            "--legacy-author",
            "u2",
            "{}",
        ])
        .unwrap();

        let selected = keys_of(cli).select().unwrap();

        assert_eq!(selected.fallback_keys().count(), 2);
    }

    #[test]
    fn direct_and_group_conflict() {
        assert!(parse(&["encrypt", "--direct", "a", "b", "--group", "g1", "hi"]).is_err());
    }

    #[test]
    fn legacy_author_requires_group() {
        assert!(parse(&["decrypt", "--direct", "a", "b", "--legacy-author", "u1", "x"]).is_err());
    }

    #[test]
    fn private_key_requires_peer_key() {
        assert!(parse(&["encrypt", "--private-key", "AAAA", "hi"]).is_err());
    }

    #[test]
    fn missing_key_selection_is_usage_error() {
        let cli = parse(&["encrypt", "hi"]).unwrap();

        assert!(matches!(keys_of(cli).select(), Err(CliError::Usage(_))));
    }

    #[test]
    fn agreement_selects_key_pair() {
        let mine = generate_key_pair().unwrap();
        let peer = generate_key_pair().unwrap();
        let private_key = mine.export_private_key().unwrap();
        let peer_key = peer.public_key().to_spki_base64().unwrap();

        let cli = parse(&[
            "render",
            "--private-key",
            private_key.as_str(),
            "--peer-key",
            peer_key.as_str(),
            "x",
        ])
        .unwrap();

        assert!(matches!(keys_of(cli).select().unwrap(), SelectedKeys::Agreed { .. }));
    }

    #[test]
    fn bad_peer_key_surfaces_crypto_error() {
        let mine = generate_key_pair().unwrap();
        let private_key = mine.export_private_key().unwrap();

        let cli =
            parse(&["render", "--private-key", private_key.as_str(), "--peer-key", "AAAA", "x"])
                .unwrap();

        assert!(matches!(keys_of(cli).select(), Err(CliError::Crypto(_))));
    }
}
