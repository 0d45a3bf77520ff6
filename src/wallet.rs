use crate::{amount::display_ether, chain::ChainClient};
use alloy::{network::EthereumWallet, primitives::Address, signers::local::PrivateKeySigner};
use eyre::bail;
use init4_bin_base::deps::tracing::{error, info, instrument, warn};
use std::fmt;

/// Prefix of the numbered private key variables: `PRIVATE_KEY_1`, `PRIVATE_KEY_2`, ...
pub const PRIVATE_KEY_PREFIX: &str = "PRIVATE_KEY_";

/// Variable holding all private keys at once, separated by commas or whitespace.
/// Takes precedence over the numbered variables when set.
pub const PRIVATE_KEYS_VAR: &str = "PRIVATE_KEYS";

/// A signing identity, identified by its 1-based position in the load order.
#[derive(Clone)]
pub struct Wallet {
    index: usize,
    signer: PrivateKeySigner,
}

impl Wallet {
    /// 1-based position in the load order.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Address derived from the private key.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Shortened address for log lines, e.g. `0xf39F...2266`.
    pub fn short_address(&self) -> String {
        short_address(&self.address())
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("index", &self.index)
            .field("address", &self.address())
            .finish()
    }
}

/// Shorten an address to its first 6 and last 4 characters.
pub fn short_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// The ordered, non-empty set of wallets the bot sends from.
#[derive(Debug, Clone)]
pub struct WalletSet {
    wallets: Vec<Wallet>,
}

impl WalletSet {
    /// Load wallets from the process environment.
    ///
    /// Uses [`PRIVATE_KEYS_VAR`] if it is set and non-empty, otherwise scans
    /// the numbered [`PRIVATE_KEY_PREFIX`] variables.
    pub fn from_env() -> eyre::Result<Self> {
        match std::env::var(PRIVATE_KEYS_VAR) {
            Ok(list) if !list.trim().is_empty() => Self::from_list(&list),
            _ => Self::from_numbered(|var| std::env::var(var).ok()),
        }
    }

    /// Scan numbered keys starting at `PRIVATE_KEY_1` until the first missing
    /// or empty variable. Keys that fail to parse are logged and skipped.
    #[instrument(skip_all)]
    pub fn from_numbered<F>(lookup: F) -> eyre::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let keys = (1..)
            .map(|i| (i, lookup(&format!("{PRIVATE_KEY_PREFIX}{i}"))))
            .map_while(|(i, key)| key.filter(|k| !k.trim().is_empty()).map(|k| (i, k)));
        Self::from_keys(keys)
    }

    /// Load keys from a single list separated by commas or whitespace.
    #[instrument(skip_all)]
    pub fn from_list(list: &str) -> eyre::Result<Self> {
        let keys = list
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|key| !key.is_empty())
            .enumerate()
            .map(|(i, key)| (i + 1, key.to_string()));
        Self::from_keys(keys)
    }

    fn from_keys<I>(keys: I) -> eyre::Result<Self>
    where
        I: IntoIterator<Item = (usize, String)>,
    {
        let mut wallets = Vec::new();
        for (key_number, key) in keys {
            match key.trim().parse::<PrivateKeySigner>() {
                Ok(signer) => {
                    let wallet = Wallet {
                        index: wallets.len() + 1,
                        signer,
                    };
                    info!(
                        key_number,
                        wallet = wallet.index,
                        address = %wallet.short_address(),
                        "loaded wallet"
                    );
                    wallets.push(wallet);
                }
                Err(_) => error!(key_number, "invalid private key format, skipping"),
            }
        }

        if wallets.is_empty() {
            bail!("no valid private keys found");
        }
        Ok(Self { wallets })
    }

    /// Number of wallets, always at least 1.
    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    /// Whether the set holds no wallets.
    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    /// Wallets in load order.
    pub fn iter(&self) -> impl Iterator<Item = &Wallet> {
        self.wallets.iter()
    }

    /// An alloy wallet holding every signer, the first one as default.
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        // non-empty by construction
        let mut wallet = EthereumWallet::new(self.wallets[0].signer.clone());
        for other in &self.wallets[1..] {
            wallet.register_signer(other.signer.clone());
        }
        wallet
    }

    /// Log the balance of every wallet. Failed queries are warned about and
    /// do not stop the loop.
    #[instrument(skip_all)]
    pub async fn log_balances<C: ChainClient>(&self, client: &C) {
        for wallet in &self.wallets {
            match client.balance(wallet.address()).await {
                Ok(balance) => info!(
                    wallet = wallet.index,
                    address = %wallet.short_address(),
                    balance = %display_ether(balance),
                    "wallet balance"
                ),
                Err(error) => warn!(
                    wallet = wallet.index,
                    %error,
                    "failed to fetch wallet balance"
                ),
            }
        }
    }
}

impl<'a> IntoIterator for &'a WalletSet {
    type Item = &'a Wallet;
    type IntoIter = std::slice::Iter<'a, Wallet>;

    fn into_iter(self) -> Self::IntoIter {
        self.wallets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use std::collections::HashMap;

    const KEY_1: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const KEY_2: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
    const KEY_3: &str = "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a";
    const KEY_4: &str = "0x7c852118294e51e653712a81e05800f419141751be58f605c371e15141b007a6";

    fn env(entries: &[(usize, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(i, key)| (format!("{PRIVATE_KEY_PREFIX}{i}"), key.to_string()))
            .collect()
    }

    fn addresses(set: &WalletSet) -> Vec<Address> {
        set.iter().map(Wallet::address).collect()
    }

    #[test]
    fn numbered_scan_stops_at_first_gap() {
        let vars = env(&[(1, KEY_1), (2, KEY_2), (4, KEY_4)]);
        let set = WalletSet::from_numbered(|var| vars.get(var).cloned()).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(
            addresses(&set),
            vec![
                address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
                address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8"),
            ]
        );
    }

    #[test]
    fn empty_variable_ends_the_scan() {
        let vars = env(&[(1, KEY_1), (2, ""), (3, KEY_3)]);
        let set = WalletSet::from_numbered(|var| vars.get(var).cloned()).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn malformed_keys_are_skipped() {
        let vars = env(&[(1, KEY_1), (2, "not-a-key"), (3, KEY_3)]);
        let set = WalletSet::from_numbered(|var| vars.get(var).cloned()).unwrap();

        assert_eq!(set.len(), 2);
        let indices: Vec<_> = set.iter().map(Wallet::index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(
            addresses(&set)[1],
            address!("0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC")
        );
    }

    #[test]
    fn no_valid_keys_is_an_error() {
        let vars = env(&[(1, "garbage")]);
        assert!(WalletSet::from_numbered(|var| vars.get(var).cloned()).is_err());
        assert!(WalletSet::from_numbered(|_| None).is_err());
        assert!(WalletSet::from_list(" , ").is_err());
    }

    #[test]
    fn list_loads_in_order() {
        let list = format!("{KEY_2}, {KEY_1}\n{KEY_4}");
        let set = WalletSet::from_list(&list).unwrap();

        assert!(!set.is_empty());
        assert_eq!(
            addresses(&set),
            vec![
                address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8"),
                address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
                address!("0x90F79bf6EB2c4f870365E785982E1f101E93b906"),
            ]
        );
    }

    #[test]
    fn short_address_keeps_prefix_and_suffix() {
        let addr = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        assert_eq!(short_address(&addr), "0xf39F...2266");
    }

    #[test]
    fn debug_does_not_leak_the_key() {
        let set = WalletSet::from_list(KEY_1).unwrap();
        let debug = format!("{set:?}");
        assert!(!debug.contains(&KEY_1[2..]));
    }

    #[test]
    fn ethereum_wallet_holds_every_signer() {
        use alloy::network::{Ethereum, NetworkWallet};

        let set = WalletSet::from_list(&format!("{KEY_1},{KEY_2}")).unwrap();
        let wallet = set.ethereum_wallet();
        let addrs = addresses(&set);

        assert_eq!(
            NetworkWallet::<Ethereum>::default_signer_address(&wallet),
            addrs[0]
        );
        assert!(NetworkWallet::<Ethereum>::has_signer_for(&wallet, &addrs[1]));
    }
}
