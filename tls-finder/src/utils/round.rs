/*
  Round a percentage to two decimal places, ties to even.

  Exact binary ties such as 3.125 go to the even hundredth (3.12). Composition
  percentages are reported at this precision; the values for one cluster then
  sum to 100 within 0.01 per reported type.
*/
#[inline(always)]
pub fn round2(val: f64) -> f64 {
  (val * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
  use super::round2;

  #[test]
  fn rounds_to_hundredths() {
    assert_eq!(round2(100.0 / 3.0), 33.33);
    assert_eq!(round2(200.0 / 3.0), 66.67);
    assert_eq!(round2(75.0), 75.0);
  }

  #[test]
  fn exact_ties_go_to_even() {
    assert_eq!(round2(100.0 / 32.0), 3.12);
    assert_eq!(round2(3100.0 / 32.0), 96.88);
    assert_eq!(round2(100.0 / 160.0), 0.62);
    assert_eq!(round2(300.0 / 160.0), 1.88);
  }
}
