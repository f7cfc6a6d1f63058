// Copyright 2024, Blog Creator Contributors
// For licensing, see licenses/COPYRIGHT.md

macro_rules! greyln {
    ($($msg:expr),*) => {{
        let msg = format!($($msg),*);
        println!("{}", msg.grey())
    }};
}

pub(crate) use greyln;
