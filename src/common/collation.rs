// src/common/collation.rs

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Comparação "natural" de nomes: sem diferenciar maiúsculas e com trechos
/// numéricos comparados pelo valor, não caractere a caractere. "Item 2" vem
/// antes de "Item 10".
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ca = a.chars().peekable();
    let mut cb = b.chars().peekable();

    loop {
        match (ca.peek().copied(), cb.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                if x.is_ascii_digit() && y.is_ascii_digit() {
                    let run_a = take_digit_run(&mut ca);
                    let run_b = take_digit_run(&mut cb);

                    // Compara pelo valor: ignora zeros à esquerda e desempata
                    // primeiro pelo comprimento do que sobrou.
                    let trimmed_a = run_a.trim_start_matches('0');
                    let trimmed_b = run_b.trim_start_matches('0');
                    let by_value = trimmed_a
                        .len()
                        .cmp(&trimmed_b.len())
                        .then_with(|| trimmed_a.cmp(trimmed_b));
                    if by_value != Ordering::Equal {
                        return by_value;
                    }
                    // "007" e "7" têm o mesmo valor; o mais curto vem antes.
                    let by_width = run_a.len().cmp(&run_b.len());
                    if by_width != Ordering::Equal {
                        return by_width;
                    }
                } else {
                    let fx = x.to_lowercase().next().unwrap_or(x);
                    let fy = y.to_lowercase().next().unwrap_or(y);
                    if fx != fy {
                        return fx.cmp(&fy);
                    }
                    ca.next();
                    cb.next();
                }
            }
        }
    }
}

fn take_digit_run(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

/// Preenche com zeros o PRIMEIRO trecho numérico do S.No até 3 dígitos, para
/// que a ordenação lexicográfica do export coloque "9" ("009") antes de "10"
/// ("010"). Trechos numéricos seguintes ficam como estão.
pub fn pad_first_digit_run(sno: &str) -> String {
    let start = match sno.find(|c: char| c.is_ascii_digit()) {
        Some(i) => i,
        None => return sno.to_string(),
    };
    let end = sno[start..]
        .find(|c: char| !c.is_ascii_digit())
        .map(|offset| start + offset)
        .unwrap_or(sno.len());
    let run = &sno[start..end];

    let mut padded = String::with_capacity(sno.len() + 3);
    padded.push_str(&sno[..start]);
    for _ in run.len()..3 {
        padded.push('0');
    }
    padded.push_str(run);
    padded.push_str(&sno[end..]);
    padded
}
