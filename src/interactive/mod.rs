//
//  tea-cli
//  interactive/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Terminal prompts built on `dialoguer`.

pub mod prompt;

pub use prompt::*;
