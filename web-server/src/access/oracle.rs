// web-server/src/access/oracle.rs
use std::str::FromStr;

use async_trait::async_trait;
use common::models::token::TokenRecord;
use solana_account_decoder::UiAccountEncoding;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::pubkey::Pubkey;
use spl_token::solana_program::program_pack::Pack;
use spl_token::state::Account as TokenAccount;

use super::GateError;

// Byte offset of the mint pubkey inside an SPL token account
const MINT_OFFSET: usize = 0;

/// Lists the claimed token records of a minting program
///
/// An absent result and an empty one both mean "nothing is claimed";
/// errors are reserved for the query layer itself failing.
#[async_trait]
pub trait OwnershipOracle: Send + Sync {
    async fn list_claimed(
        &self,
        program_address: &str,
    ) -> Result<Option<Vec<TokenRecord>>, GateError>;
}

/// Ownership oracle backed by a Solana JSON-RPC node
///
/// The drop is modeled as an SPL mint: every token account of that mint
/// holding a positive balance is one claimed unit.
pub struct SplTokenOracle {
    rpc_client: RpcClient,
}

impl SplTokenOracle {
    pub fn new(rpc_url: String) -> Self {
        Self {
            rpc_client: RpcClient::new(rpc_url),
        }
    }

    async fn scan_mint(&self, mint: &Pubkey) -> Result<Vec<TokenRecord>, GateError> {
        let filters = vec![
            RpcFilterType::DataSize(TokenAccount::LEN as u64),
            RpcFilterType::Memcmp(Memcmp::new_raw_bytes(
                MINT_OFFSET,
                mint.to_bytes().to_vec(),
            )),
        ];
        let config = RpcProgramAccountsConfig {
            filters: Some(filters),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };

        let accounts = self
            .rpc_client
            .get_program_accounts_with_config(&spl_token::id(), config)
            .await?;

        tracing::debug!("Mint {} has {} token accounts", mint, accounts.len());

        Ok(accounts
            .into_iter()
            .filter_map(|(_, account)| decode_claim(&account.data))
            .collect())
    }
}

#[async_trait]
impl OwnershipOracle for SplTokenOracle {
    async fn list_claimed(
        &self,
        program_address: &str,
    ) -> Result<Option<Vec<TokenRecord>>, GateError> {
        let mint = Pubkey::from_str(program_address)?;
        let records = self.scan_mint(&mint).await?;
        Ok(Some(records))
    }
}

// Decode one raw token account into a claim record.
// Zero balances and undecodable accounts are not claims.
fn decode_claim(data: &[u8]) -> Option<TokenRecord> {
    let account = TokenAccount::unpack(data).ok()?;
    if account.amount == 0 {
        return None;
    }
    Some(TokenRecord {
        owner: account.owner.to_string(),
        amount: account.amount,
    })
}
