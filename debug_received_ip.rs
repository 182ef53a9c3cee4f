use eml_analyzer::routing::{analyze_routing, extract_ipv4};

fn main() {
    let mut received: Vec<String> = std::env::args().skip(1).collect();
    if received.is_empty() {
        received = vec![
            "from mail.example.com (mail.example.com [192.168.1.1]) by mx.example.net".to_string(),
            "from localhost by mail.example.com with LMTP".to_string(),
            "from bogus (999.999.999.999) by mx.example.net".to_string(),
        ];
    }

    for header in &received {
        println!("Received: {}", header);
        match extract_ipv4(header) {
            Some(ip) => println!("  first IPv4 token: '{}'", ip),
            None => println!("  no IPv4 token"),
        }
    }

    let routing = analyze_routing(&received);
    println!();
    println!("Hop Count: {}", routing.hop_count());
    for hop in &routing.hops {
        println!("  Hop #{} -> {:?}", hop.index, hop.ip);
    }
}
