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

//! wbtunneld: the web console tunneling daemon.

use clap::Parser;
use log::error;

use wb_common::util::logger;
use wb_console::args::TunneldArgs;
use wb_console::tunnel;

#[tokio::main]
async fn main() {
    let args = TunneldArgs::parse();
    logger::init("wbtunneld");
    if let Err(err) = tunnel::run(&args.listen, &args.backend).await {
        error!("wbtunneld: {err}");
        std::process::exit(1);
    }
}
