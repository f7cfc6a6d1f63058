// Copyright 2024, Blog Creator Contributors
// For licensing, see licenses/COPYRIGHT.md

/// The default endpoint, a local Hardhat or Anvil node.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8545";

/// Where Hardhat writes compiled contracts.
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The contract that mints the blog tables.
pub const DEFAULT_CONTRACT: &str = "BlogCreator";
