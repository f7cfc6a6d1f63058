// Copyright 2024, Blog Creator Contributors
// For licensing, see licenses/COPYRIGHT.md

//! Lookup of compiled contracts by name.
//!
//! Artifacts are the JSON files a Hardhat compile leaves under `artifacts/`, one per
//! contract, e.g. `artifacts/contracts/BlogCreator.sol/BlogCreator.json`.

use ethers::{
    abi::{Abi, Function, ParamType, Token},
    types::Bytes,
};
use eyre::{eyre, Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum ArtifactError {
    #[error("no artifact found for contract {name} in {dir}, has the project been compiled?")]
    NotFound { name: String, dir: PathBuf },
    #[error("multiple artifacts found for contract {name}: {paths:?}")]
    Ambiguous { name: String, paths: Vec<PathBuf> },
    #[error("artifact {path} holds contract {found}, not {name}")]
    Mismatch {
        name: String,
        found: String,
        path: PathBuf,
    },
    #[error("contract {name} has no creation bytecode, is it abstract or an interface?")]
    NotDeployable { name: String },
    #[error("contract {name} constructor takes {count} argument(s) but none are given")]
    ConstructorArgs { name: String, count: usize },
    #[error("contract {name} has no accessor {accessor}")]
    UnknownAccessor { name: String, accessor: String },
    #[error("{name}.{accessor} is not a string accessor")]
    NotStringAccessor { name: String, accessor: String },
}

/// The subset of a Hardhat artifact needed to deploy and query a contract.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatArtifact {
    contract_name: String,
    abi: Abi,
    bytecode: Bytes,
}

/// A compiled contract, ready to be deployed.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
}

/// Finds the artifact for `name` anywhere under `dir`.
pub fn find(dir: &Path, name: &str) -> Result<ContractArtifact> {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = Path::new(&escaped).join("**").join(format!("{name}.json"));

    let mut paths = vec![];
    for entry in glob::glob(&pattern.to_string_lossy())? {
        let path = entry?;
        if path.components().any(|c| c.as_os_str() == "build-info") {
            continue;
        }
        paths.push(path);
    }
    paths.sort();

    match paths.len() {
        0 => Err(ArtifactError::NotFound {
            name: name.to_owned(),
            dir: dir.to_owned(),
        }
        .into()),
        1 => load(&paths[0], name),
        _ => Err(ArtifactError::Ambiguous {
            name: name.to_owned(),
            paths,
        }
        .into()),
    }
}

/// Reads a single artifact file, checking it can be deployed without arguments.
pub fn load(path: &Path, name: &str) -> Result<ContractArtifact> {
    let text = fs::read_to_string(path)
        .wrap_err_with(|| eyre!("could not read artifact {}", path.display()))?;
    let artifact: HardhatArtifact = serde_json::from_str(&text)
        .wrap_err_with(|| eyre!("could not parse artifact {}", path.display()))?;

    if artifact.contract_name != name {
        return Err(ArtifactError::Mismatch {
            name: name.to_owned(),
            found: artifact.contract_name,
            path: path.to_owned(),
        }
        .into());
    }
    if artifact.bytecode.is_empty() {
        return Err(ArtifactError::NotDeployable {
            name: name.to_owned(),
        }
        .into());
    }
    if let Some(constructor) = artifact.abi.constructor() {
        if !constructor.inputs.is_empty() {
            return Err(ArtifactError::ConstructorArgs {
                name: name.to_owned(),
                count: constructor.inputs.len(),
            }
            .into());
        }
    }

    Ok(ContractArtifact {
        name: artifact.contract_name,
        abi: artifact.abi,
        bytecode: artifact.bytecode,
    })
}

impl ContractArtifact {
    /// Calldata for a contract creation transaction.
    pub fn init_code(&self) -> Bytes {
        self.bytecode.clone()
    }

    /// Encodes a call to a zero-argument accessor returning a string.
    pub fn encode_call(&self, accessor: &str) -> Result<Bytes> {
        let function = self.accessor(accessor)?;
        let data = function
            .encode_input(&[])
            .wrap_err_with(|| eyre!("could not encode call to {accessor}"))?;
        Ok(data.into())
    }

    /// Decodes the return data of a call made with [`Self::encode_call`].
    pub fn decode_string(&self, accessor: &str, data: &[u8]) -> Result<String> {
        let function = self.accessor(accessor)?;
        let tokens = function
            .decode_output(data)
            .wrap_err_with(|| eyre!("could not decode return data of {accessor}"))?;
        tokens
            .into_iter()
            .next()
            .and_then(Token::into_string)
            .ok_or_else(|| eyre!("{accessor} returned no string"))
    }

    fn accessor(&self, accessor: &str) -> Result<&Function> {
        let function = self
            .abi
            .function(accessor)
            .map_err(|_| ArtifactError::UnknownAccessor {
                name: self.name.clone(),
                accessor: accessor.to_owned(),
            })?;
        if !function.inputs.is_empty() || function.outputs.len() != 1 {
            return Err(self.not_string(accessor));
        }
        if function.outputs[0].kind != ParamType::String {
            return Err(self.not_string(accessor));
        }
        Ok(function)
    }

    fn not_string(&self, accessor: &str) -> eyre::Report {
        ArtifactError::NotStringAccessor {
            name: self.name.clone(),
            accessor: accessor.to_owned(),
        }
        .into()
    }
}
