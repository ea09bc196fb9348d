// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn tx_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(
        Arg::new("amount")
            .long("amount")
            .short('a')
            .required(required)
            .help("Positive amount"),
    )
    .arg(
        Arg::new("type")
            .long("type")
            .short('t')
            .help("income | expense | transfer"),
    )
    .arg(Arg::new("category").long("category").short('c'))
    .arg(Arg::new("description").long("description").short('d'))
    .arg(
        Arg::new("date")
            .long("date")
            .help("YYYY-MM-DD or RFC 3339; defaults to now"),
    )
    .arg(
        Arg::new("account")
            .long("account")
            .help("Account id or name; defaults to the default account"),
    )
    .arg(
        Arg::new("to")
            .long("to")
            .help("Target account of a transfer"),
    )
    .arg(
        Arg::new("counterparty")
            .long("counterparty")
            .help("Person lent to or repaid by"),
    )
}

fn month_arg(required: bool) -> Arg {
    Arg::new("month")
        .long("month")
        .short('m')
        .required(required)
        .help("YYYY-MM")
}

pub fn build_cli() -> Command {
    Command::new("moneybag")
        .about("Local-first wallet and expense tracker with spreadsheet sync")
        .version(clap::crate_version!())
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("Path to a config.toml"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .help("Directory for the local store"),
        )
        .arg(
            Arg::new("offline")
                .long("offline")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Defer pushes and refuse pulls"),
        )
        .subcommand(Command::new("init").about("Create the local store"))
        .subcommand(
            Command::new("tx")
                .about("Record and browse transactions")
                .subcommand(tx_fields(Command::new("add"), true))
                .subcommand(
                    tx_fields(Command::new("edit"), false).arg(
                        Arg::new("id")
                            .long("id")
                            .required(true)
                            .help("Transaction id or unique prefix"),
                    ),
                )
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .long("id")
                            .required(true)
                            .help("Transaction id or unique prefix"),
                    ),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(month_arg(false))
                        .arg(Arg::new("account").long("account"))
                        .arg(Arg::new("type").long("type"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("search").long("search").short('s'))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                )),
        )
        .subcommand(
            Command::new("account")
                .about("Manage wallets")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("color").long("color"))
                        .arg(
                            Arg::new("default")
                                .long("default")
                                .action(ArgAction::SetTrue),
                        ),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("rename")
                        .arg(Arg::new("account").long("account").required(true))
                        .arg(Arg::new("name").long("name").required(true)),
                )
                .subcommand(
                    Command::new("default")
                        .arg(Arg::new("account").long("account").required(true)),
                )
                .subcommand(
                    Command::new("rm").arg(Arg::new("account").long("account").required(true)),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Dashboard and drill-down reports")
                .subcommand(json_flags(
                    Command::new("dashboard").arg(month_arg(false)),
                ))
                .subcommand(json_flags(Command::new("monthly").arg(month_arg(false))))
                .subcommand(json_flags(
                    Command::new("yearly").arg(Arg::new("year").long("year").short('y')),
                ))
                .subcommand(json_flags(
                    Command::new("category")
                        .arg(month_arg(false))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .help("income | expense (default expense)"),
                        ),
                ))
                .subcommand(json_flags(
                    Command::new("daily")
                        .arg(month_arg(false))
                        .arg(Arg::new("category").long("category")),
                )),
        )
        .subcommand(
            Command::new("lend")
                .about("Money lent to and repaid by people")
                .subcommand(json_flags(Command::new("list")))
                .subcommand(lend_fields(Command::new("give"), "to"))
                .subcommand(lend_fields(Command::new("receive"), "from")),
        )
        .subcommand(
            Command::new("bazar")
                .about("Shopping item templates")
                .subcommand(Command::new("add").arg(Arg::new("item").required(true)))
                .subcommand(Command::new("list"))
                .subcommand(Command::new("rm").arg(Arg::new("item").required(true))),
        )
        .subcommand(
            Command::new("tobuy")
                .about("Pending shopping list")
                .subcommand(Command::new("add").arg(Arg::new("item").required(true)))
                .subcommand(Command::new("list"))
                .subcommand(Command::new("done").arg(Arg::new("item").required(true))),
        )
        .subcommand(
            Command::new("sync")
                .about("Back up to a spreadsheet endpoint")
                .subcommand(Command::new("set-url").arg(Arg::new("url").required(true)))
                .subcommand(Command::new("clear"))
                .subcommand(Command::new("status"))
                .subcommand(
                    Command::new("push").arg(
                        Arg::new("force")
                            .long("force")
                            .action(ArgAction::SetTrue)
                            .help("Overwrite even if the remote copy is newer"),
                    ),
                )
                .subcommand(Command::new("pull")),
        )
        .subcommand(
            Command::new("export")
                .about("Write transactions to a file")
                .subcommand(
                    Command::new("transactions")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv | json"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
}

fn lend_fields(cmd: Command, who: &'static str) -> Command {
    cmd.arg(Arg::new(who).long(who).required(true))
        .arg(Arg::new("amount").long("amount").short('a').required(true))
        .arg(Arg::new("account").long("account"))
        .arg(Arg::new("date").long("date"))
        .arg(Arg::new("description").long("description").short('d'))
}
