use gather_rs::prelude::*;

#[derive(Debug)]
struct Movie {
    title: &'static str,
    rating: f64,
    hd_available: bool,
}

fn main() {
    let movies = [
        Movie { title: "Inception", rating: 8.8, hd_available: true },
        Movie { title: "The Dark Knight", rating: 9.0, hd_available: true },
        Movie { title: "Interstellar", rating: 8.6, hd_available: true },
        Movie { title: "Random Short Film", rating: 4.2, hd_available: false },
    ];

    let highly_rated: Vec<&str> = movies.iter().filter(|m| m.rating > 8.0).map(|m| m.title).collect();
    println!("Rated above 8.0: {:?}", highly_rated);

    println!("Any blockbuster (>9.0)? {}", any_match(&movies, |m| m.rating > 9.0));
    println!("All movies available in HD? {}", all_match(&movies, |m| m.hd_available));
    println!("No movie with rating < 3.0? {}", none_match(&movies, |m| m.rating < 3.0));
}
