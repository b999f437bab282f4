// Copyright 2024 The Android Open Source Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::Parser;

/// Tunneling proxy for the web console: accepts HTTP connections and
/// splices each one to a fixed backend address.
#[derive(Debug, Parser)]
pub struct TunneldArgs {
    /// Address to listen on for client connections
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    pub listen: String,

    /// Backend host:port every accepted connection is spliced to
    #[arg(short, long)]
    pub backend: String,
}
