// Copyright 2024, Blog Creator Contributors
// For licensing, see licenses/COPYRIGHT.md

use crate::{artifact::ContractArtifact, chain::Chain};
use ethers::{
    types::{Address, TxHash},
    utils::to_checksum,
};
use eyre::{eyre, Result, WrapErr};
use std::{fmt, io::Write};

/// The tables a blog creator contract mints when it is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Site,
    Blog,
    MembershipTiers,
    UserSubscriptions,
}

impl TableKind {
    /// Every table, in the order they are reported.
    pub const ALL: [TableKind; 4] = [
        TableKind::Site,
        TableKind::Blog,
        TableKind::MembershipTiers,
        TableKind::UserSubscriptions,
    ];

    /// The contract accessor returning this table's name.
    pub fn accessor(self) -> &'static str {
        match self {
            TableKind::Site => "CreatorSiteTableName",
            TableKind::Blog => "CreatorBlogTableName",
            TableKind::MembershipTiers => "CreatorMembershipTiersTableName",
            TableKind::UserSubscriptions => "UserSiteSubscriptionsTableName",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TableKind::Site => write!(f, "site"),
            TableKind::Blog => write!(f, "blog"),
            TableKind::MembershipTiers => write!(f, "membership tiers"),
            TableKind::UserSubscriptions => write!(f, "user subscriptions"),
        }
    }
}

/// What a finished run learned about the new contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub address: Address,
    pub tx_hash: TxHash,
    pub tables: Vec<(TableKind, String)>,
}

/// Deploys `artifact` and reports its table names to `out` as each one is read.
///
/// The first failure aborts the run, so `out` only ever holds the lines for steps
/// that succeeded.
pub async fn run<C, W>(chain: &C, artifact: &ContractArtifact, out: &mut W) -> Result<Deployment>
where
    C: Chain,
    W: Write,
{
    let tx_hash = chain
        .submit(artifact.init_code())
        .await
        .wrap_err("could not submit deployment tx")?;
    let address = chain
        .confirm(tx_hash)
        .await
        .wrap_err("deployment was not confirmed")?;

    writeln!(out, "Contract deployed to '{}'.", to_checksum(&address, None))?;
    writeln!(out)?;

    let mut tables = Vec::with_capacity(TableKind::ALL.len());
    for kind in TableKind::ALL {
        let name = table_name(chain, artifact, address, kind)
            .await
            .wrap_err_with(|| eyre!("could not read {kind} table name"))?;
        writeln!(out, "Table name '{name}' minted to contract.")?;
        tables.push((kind, name));
    }

    Ok(Deployment {
        address,
        tx_hash,
        tables,
    })
}

async fn table_name<C: Chain>(
    chain: &C,
    artifact: &ContractArtifact,
    address: Address,
    kind: TableKind,
) -> Result<String> {
    let accessor = kind.accessor();
    let data = artifact.encode_call(accessor)?;
    let ret = chain.call(address, data).await?;
    artifact.decode_string(accessor, &ret)
}
