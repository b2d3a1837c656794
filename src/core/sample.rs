/// Built-in alert used by `--sample` and in tests.
pub const SAMPLE_EMAIL: &str = "\
Agriculture
1. Stora Enso divests forest assets for EUR 900m
Automotive
2. Magirus could expand outside of Germany through acquisitions - report (translated)
* Subsidiaries planned in Switzerland, Spain, Poland, and UAE
* Aims to set up production sites in Romania, Croatia through acquisitions
* Aims to double sales to EUR 750m by 2030
3. Changan Auto-owned DEEPAL in talks for JV factory in Europe
* Ford Motor and Mazda Motor in talks
* Germany, Hungary, Italy, UK as potential venues
Computer software
8. Adarga seeks GBP 6m-GBP 8m in new funding – report
* Previous USD 20m investment round led by BOKA Group
9. Enerim sponsor KLAR Partners preps sale via Macquarie
* Mandate awarded last autumn, launch timing unclear
* Sellside awaits better visibility on 2025 financials
10. CoreWeave's USD 2bn of post-listing gains leads global IPO outperformance - Analysis
* Post results surge huge boon for CoreWeave IPO investors
* AI hyperscaler represents a quarter of all new listing gains globally
";
