// Copyright 2024, Blog Creator Contributors
// For licensing, see licenses/COPYRIGHT.md

use crate::macros::*;
use blog_creator_util::color::{Color, DebugColor};
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, JsonRpcClient, Middleware, PendingTransaction, Provider},
    signers::{LocalWallet, Signer},
    types::{
        transaction::eip2718::TypedTransaction, Address, Bytes, Eip1559TransactionRequest, TxHash,
        U64,
    },
    utils::to_checksum,
};
use eyre::{bail, eyre, Context, Result};

/// The network operations a deployment suspends on.
#[allow(async_fn_in_trait)]
pub trait Chain {
    /// Sends a contract creation transaction.
    async fn submit(&self, init_code: Bytes) -> Result<TxHash>;

    /// Waits for a creation transaction to land and returns the new contract's address.
    async fn confirm(&self, tx_hash: TxHash) -> Result<Address>;

    /// Runs a read-only call against the latest block.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;
}

/// A [`Chain`] reached over JSON-RPC.
#[derive(Debug)]
pub struct RpcChain<M> {
    client: M,
    sender: Address,
    confirmations: usize,
    verbose: bool,
}

impl RpcChain<SignerMiddleware<Provider<Http>, LocalWallet>> {
    /// Signs locally with `wallet`.
    pub async fn with_wallet(
        provider: Provider<Http>,
        wallet: LocalWallet,
        confirmations: usize,
        verbose: bool,
    ) -> Result<Self> {
        let chain_id = provider
            .get_chainid()
            .await
            .wrap_err("could not get chain id")?
            .as_u64();
        let wallet = wallet.with_chain_id(chain_id);
        let sender = wallet.address();
        let client = SignerMiddleware::new(provider, wallet);
        Ok(Self::new(client, sender, confirmations, verbose))
    }
}

impl<P: JsonRpcClient> RpcChain<Provider<P>> {
    /// Lets the node sign with its first unlocked account, like a development node's account #0.
    pub async fn with_node_account(
        provider: Provider<P>,
        confirmations: usize,
        verbose: bool,
    ) -> Result<Self> {
        let accounts = provider
            .get_accounts()
            .await
            .wrap_err("could not list node accounts")?;
        let Some(&sender) = accounts.first() else {
            bail!("node has no unlocked accounts, pass --private-key or --keystore-path");
        };
        Ok(Self::new(provider, sender, confirmations, verbose))
    }
}

impl<M: Middleware> RpcChain<M> {
    fn new(client: M, sender: Address, confirmations: usize, verbose: bool) -> Self {
        if verbose {
            greyln!("sender address: {}", to_checksum(&sender, None).lavender());
        }
        Self {
            client,
            sender,
            confirmations,
            verbose,
        }
    }

    pub fn sender(&self) -> Address {
        self.sender
    }
}

impl<M: Middleware> Chain for RpcChain<M> {
    async fn submit(&self, init_code: Bytes) -> Result<TxHash> {
        let tx = Eip1559TransactionRequest::new()
            .from(self.sender)
            .data(init_code);

        let pending = self
            .client
            .send_transaction(tx, None)
            .await
            .map_err(|e| eyre!("could not send tx: {e}"))?;
        let tx_hash = *pending;

        if self.verbose {
            greyln!("sent deployment tx: {}", tx_hash.debug_lavender());
        }
        Ok(tx_hash)
    }

    async fn confirm(&self, tx_hash: TxHash) -> Result<Address> {
        let receipt = PendingTransaction::new(tx_hash, self.client.provider())
            .confirmations(self.confirmations)
            .await
            .wrap_err("could not get receipt")?
            .ok_or_else(|| eyre!("no receipt found for tx {tx_hash:?}, was it dropped?"))?;

        if receipt.status == Some(U64::zero()) {
            bail!("deployment tx {tx_hash:?} reverted");
        }
        let address = receipt
            .contract_address
            .ok_or_else(|| eyre!("receipt for tx {tx_hash:?} has no contract address"))?;

        if self.verbose {
            let gas = receipt.gas_used.unwrap_or_default();
            greyln!(
                "confirmed deployment in block {} {} {}",
                receipt.block_number.unwrap_or_default(),
                "with".grey(),
                format!("{gas} gas").mint()
            );
        }
        Ok(address)
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let tx: TypedTransaction = Eip1559TransactionRequest::new()
            .from(self.sender)
            .to(to)
            .data(data)
            .into();
        self.client
            .call(&tx, None)
            .await
            .map_err(|e| eyre!("call to {} failed: {e}", to_checksum(&to, None)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::{
        providers::MockProvider,
        types::{Transaction, TransactionReceipt},
    };
    use std::time::Duration;
    use tokio::time::timeout;

    fn mocked() -> (RpcChain<Provider<MockProvider>>, MockProvider) {
        let (provider, mock) = Provider::mocked();
        let provider = provider.interval(Duration::from_millis(5));
        let chain = RpcChain::new(provider, Address::repeat_byte(0xf3), 1, false);
        (chain, mock)
    }

    /// Queues a mined tx followed by its receipt, in the order the pending tx polls them.
    fn mined(mock: &MockProvider, tx_hash: TxHash, receipt: TransactionReceipt) {
        let tx = Transaction {
            hash: tx_hash,
            block_number: Some(U64::from(7u64)),
            ..Default::default()
        };
        // responses are served last in, first out
        mock.push::<TransactionReceipt, _>(receipt).unwrap();
        mock.push::<Transaction, _>(tx).unwrap();
    }

    async fn confirm(chain: &RpcChain<Provider<MockProvider>>, tx_hash: TxHash) -> Result<Address> {
        timeout(Duration::from_secs(10), chain.confirm(tx_hash))
            .await
            .wrap_err("confirmation hung")?
    }

    #[tokio::test]
    async fn node_account_is_first_account() -> Result<()> {
        let (provider, mock) = Provider::mocked();
        mock.push::<Vec<Address>, _>(vec![Address::repeat_byte(1), Address::repeat_byte(2)])?;

        // only eth_accounts is queued, so any balance or nonce lookup would fail here
        let chain = RpcChain::with_node_account(provider, 1, false).await?;
        assert_eq!(chain.sender(), Address::repeat_byte(1));
        mock.assert_request("eth_accounts", ())?;
        Ok(())
    }

    #[tokio::test]
    async fn no_node_accounts() {
        let (provider, mock) = Provider::mocked();
        mock.push::<Vec<Address>, _>(Vec::new()).unwrap();

        let err = RpcChain::with_node_account(provider, 1, false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no unlocked accounts"), "{err}");
    }

    #[tokio::test]
    async fn confirms_deployed_address() -> Result<()> {
        let (chain, mock) = mocked();
        let tx_hash = TxHash::repeat_byte(0xaa);
        let address = Address::repeat_byte(0xbb);
        mined(
            &mock,
            tx_hash,
            TransactionReceipt {
                transaction_hash: tx_hash,
                block_number: Some(U64::from(7u64)),
                status: Some(U64::from(1u64)),
                contract_address: Some(address),
                ..Default::default()
            },
        );

        assert_eq!(confirm(&chain, tx_hash).await?, address);
        Ok(())
    }

    #[tokio::test]
    async fn reverted_deployment() {
        let (chain, mock) = mocked();
        let tx_hash = TxHash::repeat_byte(0xaa);
        mined(
            &mock,
            tx_hash,
            TransactionReceipt {
                transaction_hash: tx_hash,
                block_number: Some(U64::from(7u64)),
                status: Some(U64::from(0u64)),
                contract_address: Some(Address::repeat_byte(0xbb)),
                ..Default::default()
            },
        );

        let err = confirm(&chain, tx_hash).await.unwrap_err();
        assert_eq!(err.to_string(), format!("deployment tx {tx_hash:?} reverted"));
    }

    #[tokio::test]
    async fn receipt_without_contract_address() {
        let (chain, mock) = mocked();
        let tx_hash = TxHash::repeat_byte(0xaa);
        mined(
            &mock,
            tx_hash,
            TransactionReceipt {
                transaction_hash: tx_hash,
                block_number: Some(U64::from(7u64)),
                status: Some(U64::from(1u64)),
                contract_address: None,
                ..Default::default()
            },
        );

        let err = confirm(&chain, tx_hash).await.unwrap_err();
        assert!(err.to_string().contains("has no contract address"), "{err}");
    }

    #[tokio::test]
    async fn dropped_deployment() {
        let (chain, mock) = mocked();
        // the first lookup plus every retry finds nothing
        for _ in 0..4 {
            mock.push::<Option<Transaction>, _>(None).unwrap();
        }

        let err = confirm(&chain, TxHash::repeat_byte(0xaa)).await.unwrap_err();
        assert!(err.to_string().contains("was it dropped?"), "{err}");
        assert!(!err.to_string().contains('\x1b'));
    }

    #[tokio::test]
    async fn call_returns_raw_data() -> Result<()> {
        let (chain, mock) = mocked();
        let ret = Bytes::from(vec![0xde, 0xad]);
        mock.push::<Bytes, _>(ret.clone())?;

        let data = chain
            .call(Address::repeat_byte(0xbb), Bytes::from(vec![1, 2, 3, 4]))
            .await?;
        assert_eq!(data, ret);
        Ok(())
    }
}
