//! dicebattle - play a dice battle in the terminal

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dicebattle::battle::{BattleEvent, Side};
use dicebattle::{BattleConfig, BattleController, Phase};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Turn-based dice combat with a modifier pipeline
#[derive(Parser, Debug)]
#[command(name = "dicebattle", version, about = "Roll, modify, strike")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed for a reproducible run (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Dice per roll (overrides the config)
    #[arg(long)]
    dice: Option<usize>,
}

const HELP: &str = "commands: roll | commit | toggle <n> | pick <n> | status | json | restart | help | quit";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dicebattle=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config =
        BattleConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(dice) = args.dice {
        config.dice_count = dice;
    }

    let mut battle = BattleController::new(config)?;
    let mut events = battle.subscribe();

    println!("{}", HELP);
    print_status(&battle);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let mut words = line.split_whitespace();
        let Some(cmd) = words.next() else {
            continue;
        };
        let arg = words.next().and_then(|w| w.parse::<usize>().ok());

        let outcome = match (cmd, arg) {
            ("roll" | "r", _) => battle.on_roll_intent().map(|_| ()),
            ("commit" | "c", _) => battle.on_commit_intent().map(|_| ()),
            ("toggle" | "t", Some(n)) if n > 0 => battle.on_toggle_modifier(n - 1).map(|_| ()),
            ("pick" | "p", Some(n)) if n > 0 => {
                let name = battle
                    .reward_offer()
                    .and_then(|offer| offer.choices().get(n - 1))
                    .map(|m| m.name().to_string())
                    .unwrap_or_default();
                battle.on_reward_pick(&name).map(|_| ())
            }
            ("status" | "s", _) => {
                print_status(&battle);
                Ok(())
            }
            ("json", _) => {
                println!("{}", serde_json::to_string_pretty(&battle.snapshot())?);
                Ok(())
            }
            ("restart", _) => battle.start_new_level(),
            ("quit" | "q" | "exit", _) => break,
            _ => {
                println!("{}", HELP);
                Ok(())
            }
        };

        if let Err(e) = outcome {
            println!("! {}", e);
        }
        drain_events(&mut events);

        if battle.phase() == Phase::EnemyTurn {
            println!("Enemy is attacking...");
            battle.run_enemy_turn().await?;
            drain_events(&mut events);
        }
        if battle.phase() == Phase::Defeat {
            println!("Type 'restart' to try this level again, or 'quit'.");
        }
    }

    Ok(())
}

fn drain_events(rx: &mut broadcast::Receiver<BattleEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            BattleEvent::LevelStarted {
                level,
                player_hp,
                enemy_hp,
                weakness_threshold,
            } => println!(
                "== Level {} == you {} HP, enemy {} HP (weak below {})",
                level, player_hp, enemy_hp, weakness_threshold
            ),
            BattleEvent::PhaseChanged { to, .. } => match to {
                Phase::PlayerTurn => println!("Your turn! Choose your modifiers and roll."),
                Phase::Victory => println!("Victory! You defeated the enemy!"),
                Phase::Defeat => println!("Defeat... The enemy was too strong."),
                _ => {}
            },
            BattleEvent::DiceRolled {
                faces,
                raw_total,
                preview_damage,
            } => println!(
                "Rolled {:?} = {} -> {} damage",
                faces, raw_total, preview_damage
            ),
            BattleEvent::PreviewUpdated { preview_damage } => {
                println!("Damage now {}", preview_damage)
            }
            BattleEvent::SkillToggled {
                slot,
                name,
                enabled,
            } => println!(
                "[{}] {} {}",
                slot + 1,
                name,
                if enabled { "enabled" } else { "disabled" }
            ),
            BattleEvent::DamageDealt {
                target,
                dealt,
                remaining_hp,
                ..
            } => match target {
                Side::Enemy => println!("You hit for {}. Enemy HP: {}", dealt, remaining_hp),
                Side::Player => println!("Enemy hits for {}. Your HP: {}", dealt, remaining_hp),
            },
            BattleEvent::RewardOffered { choices } => {
                println!("Pick a reward:");
                for (i, name) in choices.iter().enumerate() {
                    println!("  {}. {}", i + 1, name);
                }
            }
            BattleEvent::RewardAccepted { name } => println!("Learned {}", name),
        }
    }
}

fn print_status(battle: &BattleController) {
    println!(
        "Level {} | {} | you {}/{} | enemy {}/{} (hits {})",
        battle.level(),
        battle.phase(),
        battle.player().hp(),
        battle.player().max_hp(),
        battle.enemy().hp(),
        battle.enemy().max_hp(),
        battle.enemy_attack()
    );
    for (i, slot) in battle.inventory().slots().iter().enumerate() {
        println!(
            "  [{}] {} ({})",
            i + 1,
            slot.modifier().name(),
            if slot.is_enabled() { "on" } else { "off" }
        );
    }
}
