use cardcount_core::{
    Difficulty, Event, EventBus, GameConfig, NameStyle, RngState, SlotId, StrategyId, Table,
};
use std::fs::File;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

#[derive(Debug)]
struct Options {
    difficulty: Difficulty,
    seed: Option<u64>,
    transcript: Option<PathBuf>,
}

const USAGE: &str = "usage: cardcount-cli [easy|medium|hard|nightmare] [--seed N] [--transcript FILE]";

fn parse_difficulty(value: &str) -> Option<Difficulty> {
    match value {
        "easy" => Some(Difficulty::Easy),
        "medium" => Some(Difficulty::Medium),
        "hard" => Some(Difficulty::Hard),
        "nightmare" => Some(Difficulty::Nightmare),
        _ => None,
    }
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        difficulty: Difficulty::Easy,
        seed: None,
        transcript: None,
    };
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--seed" => {
                let value = iter.next().ok_or_else(|| USAGE.to_string())?;
                options.seed = Some(value.parse().map_err(|_| format!("bad seed: {value}"))?);
            }
            "--transcript" => {
                let value = iter.next().ok_or_else(|| USAGE.to_string())?;
                options.transcript = Some(PathBuf::from(value));
            }
            other => {
                options.difficulty = parse_difficulty(other)
                    .ok_or_else(|| format!("unknown difficulty \"{other}\"\n{USAGE}"))?;
            }
        }
    }
    Ok(options)
}

enum Input {
    Tick,
    Line(String),
    Eof,
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_options(&args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };
    if let Err(err) = run(options) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(options: Options) -> Result<(), Box<dyn std::error::Error>> {
    let rng = match options.seed {
        Some(seed) => RngState::from_seed(seed),
        None => RngState::from_entropy(),
    };
    println!("dealer seed: {}", rng.seed());
    let mut table = Table::new(GameConfig::default(), options.difficulty, rng)?;
    let mut events = EventBus::default();
    let mut transcript: Vec<Event> = Vec::new();

    table.new_game(&mut events);
    render_drained(&table, &mut events, &mut transcript);
    print_roster(&table);
    println!("launch commands: add <decks> | strategies | use <slot> <strategy> | start | quit");

    let (tx, rx) = mpsc::channel::<Input>();
    let stdin_tx = tx.clone();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if stdin_tx.send(Input::Line(line)).is_err() {
                return;
            }
        }
        let _ = stdin_tx.send(Input::Eof);
    });
    let interval = Duration::from_millis(table.config().tick_interval_ms);
    thread::spawn(move || loop {
        thread::sleep(interval);
        if tx.send(Input::Tick).is_err() {
            return;
        }
    });

    for input in rx {
        match input {
            Input::Tick => table.tick(&mut events),
            Input::Line(line) => {
                if !handle_command(&mut table, &mut events, line.trim()) {
                    break;
                }
            }
            Input::Eof => break,
        }
        render_drained(&table, &mut events, &mut transcript);
        if table.is_game_over() {
            break;
        }
    }

    let score = table.score();
    println!("final score: {}/{}", score.correct, score.total);
    if let Some(path) = options.transcript {
        serde_json::to_writer_pretty(File::create(&path)?, &transcript)?;
        println!("transcript written to {}", path.display());
    }
    Ok(())
}

/// Returns false when the session should end.
fn handle_command(table: &mut Table, events: &mut EventBus, line: &str) -> bool {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let report = |result: Result<(), cardcount_core::TableError>| {
        if let Err(err) = result {
            println!("rejected: {err}");
        }
    };
    match fields.as_slice() {
        [] => {}
        ["quit"] | ["q"] => return false,
        ["start"] => {
            table.pause(false, events);
            println!("commands: <count> | answer <slot> <count> | pause | reshuffle <slot> | remove <slot> | swap <slot> | quit");
        }
        ["pause"] | ["p"] => {
            let paused = !table.is_paused();
            table.pause(paused, events);
        }
        ["add", decks] => match (next_fake_slot(table), decks.parse::<u32>()) {
            (Some(id), Ok(decks)) => report(table.activate_slot(id, decks, events)),
            (None, _) => println!("no open seat to activate"),
            (_, Err(_)) => println!("bad deck count: {decks}"),
        },
        ["strategies"] => {
            for (id, strategy) in table.strategies().iter() {
                println!("  {}: {}", id.0, strategy.name());
            }
        }
        ["use", slot, strategy] => match (slot.parse(), strategy.parse()) {
            (Ok(slot), Ok(strategy)) => {
                report(table.select_strategy(SlotId(slot), StrategyId(strategy)));
            }
            _ => println!("usage: use <slot> <strategy>"),
        },
        ["answer", slot, guess] | ["a", slot, guess] => match (slot.parse(), guess.parse()) {
            (Ok(slot), Ok(guess)) => {
                report(table.submit_answer(SlotId(slot), guess, events).map(|_| ()));
            }
            _ => println!("usage: answer <slot> <count>"),
        },
        [guess] if guess.parse::<i32>().is_ok() => {
            let guess = guess.parse().unwrap_or_default();
            let pending = table.pending_quiz_ids().next();
            match pending {
                Some(slot) => report(table.submit_answer(slot, guess, events).map(|_| ())),
                None => println!("no quiz is waiting"),
            }
        }
        ["reshuffle", slot] | ["r", slot] => match slot.parse() {
            Ok(slot) => report(table.request_reshuffle(SlotId(slot), events)),
            Err(_) => println!("usage: reshuffle <slot>"),
        },
        ["remove", slot] | ["x", slot] => match slot.parse() {
            Ok(slot) => report(table.request_remove(SlotId(slot), events)),
            Err(_) => println!("usage: remove <slot>"),
        },
        ["swap", slot] | ["w", slot] => match slot.parse() {
            Ok(slot) => report(table.request_swap(SlotId(slot), events)),
            Err(_) => println!("usage: swap <slot>"),
        },
        _ => println!("unrecognized command: {line}"),
    }
    true
}

fn next_fake_slot(table: &Table) -> Option<SlotId> {
    table
        .slots()
        .iter()
        .find(|slot| slot.is_fake())
        .map(|slot| slot.id())
}

fn print_roster(table: &Table) {
    for slot in table.slots() {
        if slot.is_fake() {
            println!("slot {}: open seat", slot.id().0);
        } else {
            let strategy = table
                .strategies()
                .get(slot.strategy())
                .map(|strategy| strategy.name().to_string())
                .unwrap_or_default();
            println!(
                "slot {}: {} deck(s), {} cards, {}",
                slot.id().0,
                slot.deck_count(),
                slot.cards_left(),
                strategy
            );
        }
    }
}

fn render_drained(table: &Table, events: &mut EventBus, transcript: &mut Vec<Event>) {
    let drained: Vec<Event> = events.drain().collect();
    for event in &drained {
        render_event(table, event);
    }
    transcript.extend(drained);
}

fn render_event(table: &Table, event: &Event) {
    match event {
        Event::CardDealt { slot, card } => {
            let left = table.slot(*slot).map(|slot| slot.cards_left()).unwrap_or(0);
            println!(
                "slot {}: {} ({left} left)",
                slot.0,
                card.name(NameStyle::Standard)
            );
        }
        Event::QuizPosted { slot } => {
            println!(
                "slot {}: joker! what is the running count? (answer {} <count>)",
                slot.0, slot.0
            );
        }
        Event::Answered { slot, correct } => {
            let verdict = if *correct { "correct" } else { "wrong" };
            println!("slot {}: {verdict}", slot.0);
        }
        Event::ScoreChanged { correct, total } => println!("score: {correct}/{total}"),
        Event::SlotActivated { slot } => println!("slot {} joined the table", slot.0),
        Event::SlotRemoved { slot } => println!("slot {} left the table", slot.0),
        Event::SlotFinished { slot } => {
            println!("slot {}: deck exhausted (reshuffle {} to continue)", slot.0, slot.0);
        }
        Event::SlotReshuffled { slot } => println!("slot {}: fresh deck", slot.0),
        Event::SwapRequested { slot } => println!("slot {} marked for swap", slot.0),
        Event::SlotsSwapped { first, second } => {
            println!("slots {} and {} swapped places", first.0, second.0);
        }
        Event::SlotCountChanged { count } => println!("{count} seat(s) on the table"),
        Event::PausedChanged { paused } => {
            println!("{}", if *paused { "paused" } else { "dealing" });
        }
        Event::GameOver => println!("every deck is done — game over"),
    }
}
