use citycast_core::{CurrentConditions, ForecastSample, LookupState, RecentSearches, Theme};

pub fn print_header(theme: Theme) {
    let toggle = match theme {
        Theme::Light => "light",
        Theme::Dark => "dark",
    };
    println!("Weather App  [{toggle} theme]");
}

pub fn print_history(history: &RecentSearches) {
    if history.is_empty() {
        println!("No recent searches.");
        return;
    }

    println!("Recent Searches");
    for (i, city) in history.entries().iter().enumerate() {
        println!("  {}. {city}", i + 1);
    }
}

pub fn print_state(state: &LookupState) {
    if let Some(error) = &state.error {
        println!("{error}");
    }

    if state.is_loading {
        println!("Loading weather for {}...", state.current_city);
        return;
    }

    if let Some(current) = &state.current {
        print_current(current);
    }

    if !state.daily_forecast.is_empty() {
        println!();
        println!("5-Day Forecast");
        for sample in &state.daily_forecast {
            print_sample(sample);
        }
    }
}

fn print_current(current: &CurrentConditions) {
    println!();
    println!("{}", current.name);
    println!("  {}°C  {}", current.rounded_temperature(), current.description);
    println!("  Feels like: {:.1}°C", current.feels_like_c);
    println!("  Humidity:   {}%", current.humidity_pct);
    println!("  Wind Speed: {} m/s", current.wind_speed);
    println!("  Icon:       {}", current.icon_url());
    println!("  Updated:    {}", current.observed_at.format("%a %H:%M UTC"));
}

fn print_sample(sample: &ForecastSample) {
    println!("{}", sample_line(sample));
}

fn sample_line(sample: &ForecastSample) -> String {
    format!(
        "  {:<4} {:>4}°C  {:<20} {}",
        sample.weekday(),
        sample.rounded_temperature(),
        sample.description,
        sample.icon_url()
    )
}
