//! Asteroids Core headless runner
//!
//! Loads settings, lets the demo pilot play one game as fast as the machine
//! allows, forwards audio cues to a logging sink and records the final score.
//!
//! Usage: `asteroids-core [settings.json]`

fn main() {
    use std::path::PathBuf;

    use asteroids_core::Settings;
    use asteroids_core::audio::{AudioManager, LogSink};
    use asteroids_core::highscores::HighScores;
    use asteroids_core::persistence::store_for_path;
    use asteroids_core::sim::{GameEvent, GameState, TickInput, tick};

    env_logger::init();
    log::info!("Asteroids Core (headless) starting...");

    let settings_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("asteroids.json"));
    let settings = Settings::load_or_default(&settings_path);

    let seed = settings.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });
    let mut state = GameState::with_tuning(seed, settings.tuning.clone());
    state.master_volume = settings.master_volume;
    log::info!("Game initialized with seed: {}", seed);

    let mut audio = AudioManager::new(LogSink::default());
    audio.set_master_volume(settings.master_volume);
    audio.set_sfx_volume(settings.sfx_volume);
    audio.set_muted(settings.muted);

    let mut store = store_for_path(&settings.scores_path);
    let mut best = match store.load() {
        Ok(scores) => scores,
        Err(e) => {
            log::warn!("Could not read best scores: {}", e);
            HighScores::new()
        }
    };

    let input = TickInput {
        demo: true,
        ..Default::default()
    };
    let mut final_score = None;
    while state.time_ticks < settings.max_ticks && final_score.is_none() {
        tick(&mut state, &input);
        for event in state.drain_events() {
            match event {
                GameEvent::Audio(command) => audio.apply(command),
                GameEvent::ExtraLife { lives } => log::info!("Extra life! {} ships left", lives),
                GameEvent::GameOver { score, level } => {
                    log::info!("Final score {} on level {}", score, level);
                    final_score = Some(score);
                }
                _ => {}
            }
        }
    }

    let score = final_score.unwrap_or(state.score);
    match best.register(&settings.player_name, score, store.as_mut()) {
        Ok(Some(rank)) => log::info!("New best score #{}: {}", rank, score),
        Ok(None) => log::info!("Score {} did not make the table", score),
        // Gameplay is over either way; the table just stays unsaved
        Err(e) => log::warn!("Could not save best scores: {}", e),
    }

    println!(
        "seed {} | level {} | score {} | ticks {} | cues {}",
        seed,
        state.level,
        score,
        state.time_ticks,
        audio.sink().played.len()
    );
    for (i, entry) in best.entries.iter().enumerate() {
        println!("{:>2}. {:<12} {:>8}", i + 1, entry.name, entry.score);
    }
}
