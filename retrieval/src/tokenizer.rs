use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;

lazy_static! {
    // Words of 2..=25 chars, allowing inner hyphens/apostrophes and a leading '#' or '@'.
    static ref RE: Regex = Regex::new(r"[#@\w](?:['\-]?\w){1,24}").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        // NLTK's English list, including the bare contraction stems it strips.
        let english: &[&str] = &[
            "i","me","my","myself","we","our","ours","ourselves","you","you're","you've","you'll","you'd","your","yours","yourself","yourselves",
            "he","him","his","himself","she","she's","her","hers","herself","it","it's","its","itself",
            "they","them","their","theirs","themselves","what","which","who","whom","this","that","that'll","these","those",
            "am","is","are","was","were","be","been","being","have","has","had","having","do","does","did","doing",
            "a","an","the","and","but","if","or","because","as","until","while","of","at","by","for","with","about","against",
            "between","into","through","during","before","after","above","below","to","from","up","down","in","out","on","off",
            "over","under","again","further","then","once","here","there","when","where","why","how",
            "all","any","both","each","few","more","most","other","some","such","no","nor","not","only","own","same","so","than",
            "too","very","s","t","can","will","just","don","don't","should","should've","now","d","ll","m","o","re","ve","y",
            "ain","aren","aren't","couldn","couldn't","didn","didn't","doesn","doesn't","hadn","hadn't","hasn","hasn't",
            "haven","haven't","isn","isn't","ma","mightn","mightn't","mustn","mustn't","needn","needn't","shan","shan't",
            "shouldn","shouldn't","wasn","wasn't","weren","weren't","won","won't","wouldn","wouldn't"
        ];
        // Boilerplate that shows up on nearly every encyclopedia page.
        let corpus: &[&str] = &[
            "category","references","also","links","extenal","see","thumb","became","may",
            "considered","known","meaning","mean","occur","describe"
        ];
        english.iter().chain(corpus.iter()).copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Tokenize text into terms using NFKC normalization, lowercase, stopword removal, and stemming.
///
/// Terms come back in text order with repeats kept, so callers can count them.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    RE.find_iter(&normalized)
        .map(|mat| mat.as_str())
        .filter(|token| !is_stopword(token))
        .map(|token| STEMMER.stem(token).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Running, runner's run!");
        assert!(t.iter().any(|w| w == "run"));
    }

    #[test]
    fn keeps_hashtags_and_inner_hyphens() {
        let t = tokenize("#rust state-of-the-art");
        assert!(t.iter().any(|w| w.starts_with("#rust")));
        assert!(t.iter().any(|w| w.starts_with("state-of-the-art")));
    }

    #[test]
    fn drops_single_characters_and_corpus_stopwords() {
        let t = tokenize("x category references thumb");
        assert!(t.is_empty());
    }

    #[test]
    fn drops_contraction_stems() {
        let t = tokenize("won don ain needn shan mightn ma delta");
        assert_eq!(t, vec!["delta".to_string()]);
    }
}
