// Copyright 2024, Blog Creator Contributors
// For licensing, see licenses/COPYRIGHT.md

pub mod color;
pub mod sys;
pub mod text;
